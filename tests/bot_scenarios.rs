#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

mod support;

use support::{BotHarness, FakePlugins, Sent, HASH_A};
use vimhelp::{BotConfig, Listener, Resolution, PLUGIN_MANAGER_UNAVAILABLE};

fn config() -> BotConfig {
    BotConfig::default()
}

#[tokio::test]
async fn help_is_fenced_when_markdown_is_on() {
    let harness = BotHarness::new(&config(), None);

    let (sink, fired) = harness.say(":help help").await;

    assert_eq!(sink.sent(), vec![Sent::Send("```\n*help*\n```".to_string())]);
    assert_eq!(
        fired,
        vec![Listener::HearHelp {
            subject: "help".to_string()
        }]
    );
}

#[tokio::test]
async fn help_is_plain_when_markdown_is_off() {
    let config = BotConfig {
        markdown: false,
        ..config()
    };
    let harness = BotHarness::new(&config, None);

    let (sink, _) = harness.say(":h help").await;

    assert_eq!(sink.texts(), vec!["*help*".to_string()]);
}

#[tokio::test]
async fn help_errors_are_never_fenced() {
    for markdown in [true, false] {
        let config = BotConfig {
            markdown,
            ..config()
        };
        let harness = BotHarness::new(&config, None);

        let (sink, _) = harness.say(":help not-existing").await;

        assert_eq!(
            sink.texts(),
            vec!["E149: Sorry, no help for not-existing".to_string()]
        );
    }
}

#[tokio::test]
async fn help_errors_fall_back_to_message_then_placeholder() {
    let harness = BotHarness::new(&config(), None);

    let (other, _) = harness.say(":help other-error").await;
    let (unknown, _) = harness.say(":help unknown-error").await;

    assert_eq!(other.texts(), vec!["Other Error".to_string()]);
    assert_eq!(unknown.texts(), vec!["[Unknown Error]".to_string()]);
}

#[tokio::test]
async fn only_the_first_word_is_looked_up() {
    let harness = BotHarness::new(&config(), None);

    let (sink, _) = harness.say(":help options and more").await;

    assert_eq!(sink.texts(), vec!["```\n*options*\n```".to_string()]);
    assert_eq!(harness.help.queries(), vec!["options".to_string()]);
}

#[tokio::test]
async fn bare_help_and_other_ex_commands_are_ignored() {
    let harness = BotHarness::new(&config(), None);

    for text in [":help", ":help ", ":hoge", "hello :help help"] {
        let (sink, fired) = harness.say(text).await;
        assert!(sink.sent().is_empty(), "{text:?}");
        assert!(fired.is_empty(), "{text:?}");
    }
    assert!(harness.help.queries().is_empty());
}

#[tokio::test]
async fn multiline_mode_matches_help_on_any_line() {
    let text = "@hubot\nBTW,\n:h help";

    let single = BotHarness::new(&config(), None);
    let (sink, _) = single.say(text).await;
    assert!(sink.sent().is_empty());

    let multiline = BotHarness::new(
        &BotConfig {
            multiline: true,
            ..config()
        },
        None,
    );
    let (sink, _) = multiline.say(text).await;
    assert_eq!(sink.sent(), vec![Sent::Send("```\n*help*\n```".to_string())]);
}

#[tokio::test]
async fn addressed_help_is_a_reply() {
    let harness = BotHarness::new(&config(), None);

    let (sink, fired) = harness.say("@hubot :h help").await;

    assert_eq!(sink.sent(), vec![Sent::Reply("```\n*help*\n```".to_string())]);
    assert_eq!(
        fired,
        vec![Listener::RespondHelp {
            subject: "help".to_string()
        }]
    );
}

#[tokio::test]
async fn addressed_help_follows_the_configured_name() {
    let config = BotConfig {
        bot_name: "vimbot".to_string(),
        ..config()
    };
    let harness = BotHarness::new(&config, None);

    let (to_other, _) = harness.say("@hubot :h help").await;
    let (to_bot, _) = harness.say("vimbot: :h help").await;

    assert!(to_other.sent().is_empty());
    assert_eq!(to_bot.sent(), vec![Sent::Reply("```\n*help*\n```".to_string())]);
}

#[tokio::test]
async fn plugin_commands_report_unavailable_manager() {
    let harness = BotHarness::new(&config(), None);

    for text in ["/vimhelp", "/vimhelp plugin install foo", "!vimhelp plugin list"] {
        let (sink, fired) = harness.say(text).await;
        assert_eq!(sink.texts(), vec![PLUGIN_MANAGER_UNAVAILABLE.to_string()]);
        assert_eq!(fired, vec![Listener::Vimhelp { resolution: None }]);
    }
}

#[tokio::test]
async fn install_reports_each_plugin() {
    let harness = BotHarness::with_plugins(&[]);

    let (sink, fired) = harness.say("/vimhelp plugin install success failure").await;

    assert_eq!(
        sink.sorted_texts(),
        vec![
            "Installation failure: failure\n```\nERROR\n```".to_string(),
            format!("Installation success: success ({})", &HASH_A[..7]),
        ]
    );
    assert_eq!(
        fired,
        vec![Listener::Vimhelp {
            resolution: Some(Resolution::Handled {
                command: "plugin install".to_string()
            })
        }]
    );
    assert_eq!(
        harness.plugin_calls(),
        vec!["install failure".to_string(), "install success".to_string()]
    );
}

#[tokio::test]
async fn add_is_install() {
    let install = BotHarness::with_plugins(&[]);
    let add = BotHarness::with_plugins(&[]);

    let (installed, _) = install.say("/vimhelp plugin install success failure").await;
    let (added, _) = add.say("/vimhelp plugin add success failure").await;

    assert_eq!(installed.sorted_texts(), added.sorted_texts());
}

#[tokio::test]
async fn uninstall_aliases_share_one_handler() {
    for verb in ["uninstall", "rm", "remove", "delete"] {
        let harness = BotHarness::with_plugins(&[]);
        let (sink, _) = harness.say(&format!("/vimhelp plugin {verb} success failure")).await;

        assert_eq!(
            sink.sorted_texts(),
            vec![
                "Uninstallation failure: failure\n```\nPlugin is not installed: failure\n```"
                    .to_string(),
                "Uninstallation success: success".to_string(),
            ],
            "{verb}"
        );
    }
}

#[tokio::test]
async fn update_without_names_updates_every_plugin_quietly() {
    let harness = BotHarness::with_plugins(&["same", "updated", "failure"]);

    let (sink, _) = harness.say("/vimhelp plugin update").await;

    assert_eq!(
        sink.sorted_texts(),
        vec![
            "Update failure: failure\n```\nERROR\n```".to_string(),
            "Update success: updated (0123456 => 5678901)".to_string(),
        ]
    );
    assert_eq!(harness.plugin_calls().len(), 3);
}

#[tokio::test]
async fn list_is_one_message() {
    let harness = BotHarness::with_plugins(&["a", "b", "c"]);

    let (sink, _) = harness.say("/vimhelp plugin list").await;

    assert_eq!(sink.texts(), vec!["a\nb\nc".to_string()]);
    assert!(harness.plugin_calls().is_empty());
}

#[tokio::test]
async fn bare_command_shows_top_level_usage() {
    let harness = BotHarness::with_plugins(&[]);

    let (sink, _) = harness.say("/vimhelp").await;

    let texts = sink.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Utilities for :help"));
    assert!(harness.plugin_calls().is_empty());
}

#[tokio::test]
async fn plugin_group_usage_names_the_plugin_manager() {
    let harness = BotHarness::with_plugins(&[]);

    let (sink, _) = harness.say("/vimhelp plugin").await;

    let texts = sink.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Plugin Manager for :help"));
    assert!(texts[0].contains("[aliases: add]"));
}

#[tokio::test]
async fn install_without_names_is_usage_not_action() {
    let harness = BotHarness::with_plugins(&[]);

    let (sink, _) = harness.say("/vimhelp plugin install").await;

    assert_eq!(sink.texts().len(), 1);
    assert!(harness.plugin_calls().is_empty());
}

#[tokio::test]
async fn unknown_verb_suggests_close_matches() {
    let harness = BotHarness::with_plugins(&[]);

    let (sink, _) = harness.say("/vimhelp plugin instal foo").await;

    let texts = sink.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Did you mean install?"), "{}", texts[0]);
}

#[tokio::test]
async fn repeated_batches_format_identically() {
    let harness = BotHarness::with_plugins(&[]);

    let (first, _) = harness.say("/vimhelp plugin install a b failure c").await;
    let (second, _) = harness.say("/vimhelp plugin install a b failure c").await;

    assert_eq!(first.sorted_texts(), second.sorted_texts());
    assert_eq!(first.texts().len(), 4);
}

#[tokio::test]
async fn concurrency_cap_of_one_still_answers_every_plugin() {
    let config = BotConfig {
        concurrency: 1,
        ..config()
    };
    let harness = BotHarness::new(&config, Some(FakePlugins::default()));

    let (sink, _) = harness.say("/vimhelp plugin install a b c").await;

    assert_eq!(sink.texts().len(), 3);
}
