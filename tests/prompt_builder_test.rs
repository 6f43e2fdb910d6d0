// ABOUTME: Integration tests for system-prompt assembly
// ABOUTME: Verifies line ordering, defaults, and knowledge-base inclusion rules

// SPDX-License-Identifier: MIT OR Apache-2.0

use clipscript::prompt::{build_system_prompt, PromptParams};

#[test]
fn test_parameter_lines_appear_in_fixed_order() {
    let prompt = build_system_prompt(
        "",
        &PromptParams {
            platform: Some("TikTok"),
            profile: Some("fitness coach"),
            topic: Some("morning routines"),
            style: Some("punchy and direct"),
            duration: Some("45"),
        },
    );

    let platform = prompt.find("Platform: TikTok").unwrap();
    let profile = prompt.find("Account positioning: fitness coach").unwrap();
    let topic = prompt.find("Topic: morning routines").unwrap();
    let duration = prompt.find("Script duration: 45 seconds").unwrap();
    let style = prompt.find("punchy and direct").unwrap();

    assert!(platform < profile);
    assert!(profile < topic);
    assert!(topic < duration);
    assert!(duration < style);
}

#[test]
fn test_absent_parameters_fall_back_to_defaults() {
    let prompt = build_system_prompt("", &PromptParams::default());

    assert!(prompt.contains("Platform: unspecified"));
    assert!(prompt.contains("Account positioning: unspecified"));
    assert!(prompt.contains("Topic: unspecified"));
    assert!(prompt.contains("Script duration: 30 seconds"));
    assert!(prompt.contains("Formatting requirements"));
}

#[test]
fn test_knowledge_base_included_only_when_non_empty() {
    let with_kb = build_system_prompt("hook in the first second", &PromptParams::default());
    assert!(with_kb.contains("Short-video knowledge base (excerpt):"));
    assert!(with_kb.contains("hook in the first second"));

    let without_kb = build_system_prompt("", &PromptParams::default());
    assert!(!without_kb.contains("Short-video knowledge base"));
}

#[test]
fn test_rules_follow_parameter_block() {
    let prompt = build_system_prompt("kb", &PromptParams::default());

    let duration = prompt.find("Script duration:").unwrap();
    let rules = prompt
        .find("short-video script and copywriting assistant")
        .unwrap();
    let kb = prompt.find("Short-video knowledge base").unwrap();

    assert!(duration < rules);
    assert!(rules < kb);
}

#[test]
fn test_prompt_never_contains_markdown_emphasis() {
    let prompt = build_system_prompt(
        "plain kb text",
        &PromptParams {
            platform: Some("Reels"),
            ..PromptParams::default()
        },
    );
    assert!(!prompt.contains('*'));
}
