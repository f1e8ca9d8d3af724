#![no_main]

use libfuzzer_sys::fuzz_target;
use sonarun::output::slugify;
use sonarun::{CommandOutput, ProjectIdentity, extract_task_id, has_success_marker};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Split the input into two streams to exercise the stdout/stderr precedence
        let mid = input
            .char_indices()
            .nth(input.chars().count() / 2)
            .map_or(input.len(), |(i, _)| i);
        let (stdout, stderr) = input.split_at(mid);
        test_task_id_extraction(stdout, stderr);
        test_project_key(input);
        test_slug(input);
    }
});

fn test_task_id_extraction(stdout: &str, stderr: &str) {
    if let Some(id) = extract_task_id(stdout, stderr) {
        assert!(!id.is_empty());
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }

    let output = CommandOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    };
    let _ = has_success_marker(&output);
}

fn test_project_key(path: &str) {
    if let Ok(identity) = ProjectIdentity::from_path(path) {
        assert!(!identity.key().is_empty());
        assert!(!identity.key().contains('/'));
        assert!(!identity.key().contains('\\'));
    }
}

fn test_slug(value: &str) {
    let slug = slugify(value);
    assert!(!slug.is_empty());
    assert!(!slug.starts_with('-') && !slug.ends_with('-'));
    assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
}
