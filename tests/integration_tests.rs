//! Integration tests for the fast-rewriter library
//!
//! These tests drive whole streams through the public API and check the
//! fast-import output end to end.

use std::io::Cursor;

use fast_rewriter::stream::{
    BlockReader, BugMatch, BugMatcher, BugPatterns, LineEnding, Rewriter, RewriterOptions,
};
use fast_rewriter::{RewriteSummary, VERSION};

const URL_7: &str = "https://bugzilla.mozilla.org/show_bug.cgi?id=7";
const URL_8: &str = "https://bugzilla.mozilla.org/show_bug.cgi?id=8";

fn lf_options() -> RewriterOptions {
    RewriterOptions {
        line_ending: LineEnding::Lf,
        ..RewriterOptions::default()
    }
}

fn rewrite(input: &[u8], patterns: BugPatterns) -> (RewriteSummary, Vec<u8>, String) {
    let mut output = Vec::new();
    let mut diagnostics = Vec::new();
    let summary = Rewriter::new(lf_options(), patterns)
        .run(input, &mut output, &mut diagnostics)
        .expect("stream should rewrite");
    (summary, output, String::from_utf8(diagnostics).unwrap())
}

/// A bzr-style export: tag reset, a commit with a directory and an inline
/// blob, and a commit carrying two-line bug metadata plus directory moves.
fn bzr_export() -> Vec<u8> {
    let bugs = format!("{} fixed\n{} fixed", URL_7, URL_8);
    format!(
        "feature done\n\
         reset refs/tags/release 1\n\
         from :5\n\
         commit refs/heads/master\n\
         mark :1\n\
         committer Jane <jane@example.org> 1300000000 +0000\n\
         data 13\n\
         Initial tree\n\
         property branch-nick 5 trunk\n\
         M 040000 - docs\n\
         M 100644 inline docs/readme.txt\n\
         data 6\n\
         hello\n\
         \n\
         commit refs/heads/master\n\
         mark :2\n\
         author Bob <bob@example.org> 1300000100 +0000\n\
         committer Jane <jane@example.org> 1300000100 +0000\n\
         data 18\n\
         Bug 7 - fix crash\n\
         \n\
         property bugs {} {}\n\
         from :1\n\
         R docs manual\n\
         D manual\n\
         D old.txt\n\
         progress checkpoint\n\
         M 100644 inline src/main.c\n\
         data 0\n\
         \n",
        bugs.len(),
        bugs
    )
    .into_bytes()
}

#[test]
fn test_bzr_export_rewrite() {
    let (summary, output, diagnostics) = rewrite(&bzr_export(), BugPatterns::default());
    let output = String::from_utf8(output).unwrap();

    insta::assert_snapshot!(output, @r"
reset refs/tags/release_1
from :5

commit refs/heads/master
mark :1
committer Jane <jane@example.org> 1300000000 +0000
data 13
Initial tree

M 100644 inline docs/readme.txt
data 6
hello

commit refs/heads/master
mark :2
author Bob <bob@example.org> 1300000100 +0000
committer Jane <jane@example.org> 1300000100 +0000
data 65
Bug 7 - fix crash

https://bugzilla.mozilla.org/show_bug.cgi?id=8
from :1
D old.txt
M 100644 inline src/main.c
data 0
    ");

    assert_eq!(diagnostics, "Skipping: progress checkpoint\n");
    assert_eq!(
        summary,
        RewriteSummary {
            commits: 2,
            resets: 1,
            blobs: 2,
            blob_bytes: 6,
            references_added: 1,
            directory_operations_suppressed: 2,
            skipped_tokens: 1,
        }
    );
}

#[test]
fn test_every_data_header_matches_its_payload() {
    let (_, output, _) = rewrite(&bzr_export(), BugPatterns::default());

    let mut reader = BlockReader::new(Cursor::new(output));
    let mut headers = 0;
    while let Some(token) = reader.read_token().unwrap() {
        if let Some(len) = token.strip_prefix("data ") {
            let len: usize = len.parse().unwrap();
            reader.read_bytes(len).unwrap();
            // Each payload ends exactly where the record terminator begins
            assert_eq!(reader.read_token().unwrap().as_deref(), Some(""));
            headers += 1;
        }
    }
    assert_eq!(headers, 4);
}

#[test]
fn test_rewrite_is_idempotent() {
    let (_, first, _) = rewrite(&bzr_export(), BugPatterns::default());
    let (_, second, diagnostics) = rewrite(&first, BugPatterns::default());
    assert_eq!(
        String::from_utf8(second).unwrap(),
        String::from_utf8(first).unwrap()
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn test_message_already_mentioning_every_bug_is_unchanged() {
    let bugs = format!("{} fixed", URL_7);
    let input = format!(
        "commit refs/heads/master\nmark :1\ncommitter A <a@x> 0 +0000\n\
         data 10\nbug 7 done\nproperty bugs {} {}\nM 100644 :1 a.txt\n",
        bugs.len(),
        bugs
    );
    let (summary, output, _) = rewrite(input.as_bytes(), BugPatterns::default());
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "commit refs/heads/master\nmark :1\ncommitter A <a@x> 0 +0000\n\
         data 10\nbug 7 done\nM 100644 :1 a.txt\n"
    );
    assert_eq!(summary.references_added, 0);
}

/// Matches whitespace-separated words of the form `<prefix><digits>`.
struct PrefixMatcher(&'static str);

impl BugMatcher for PrefixMatcher {
    fn find_all(&self, text: &str) -> Vec<BugMatch> {
        text.split_whitespace()
            .filter_map(|word| {
                let id = word.strip_prefix(self.0)?;
                (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then(|| BugMatch {
                    id: id.to_string(),
                    text: word.to_string(),
                })
            })
            .collect()
    }
}

#[test]
fn test_injected_matchers() {
    let patterns = BugPatterns {
        in_message: Box::new(PrefixMatcher("#")),
        in_metadata: Box::new(PrefixMatcher("TRACK-")),
    };
    let input = b"commit refs/heads/master\nmark :1\ncommitter A <a@x> 0 +0000\n\
                  data 7\nRefs #3\nproperty bugs 15 TRACK-3 TRACK-4\n";
    let (summary, output, _) = rewrite(input, patterns);

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "commit refs/heads/master\nmark :1\ncommitter A <a@x> 0 +0000\n\
         data 16\nRefs #3\n\nTRACK-4\n"
    );
    assert_eq!(summary.references_added, 1);
}

#[test]
fn test_library_version() {
    assert!(!VERSION.is_empty());
    assert!(VERSION.contains('.'));
}
