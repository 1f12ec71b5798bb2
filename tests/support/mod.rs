#![allow(dead_code, clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use vimhelp::ports::PortFuture;
use vimhelp::{
    BotConfig, HelpSearch, IncomingMessage, Listener, PluginRepository, ResponseSink,
    UpdateInfo, VimHelpBot, VimHelpError,
};

pub const HASH_A: &str = "0123456789012345678901234567890123456789";
pub const HASH_B: &str = "5678901234567890123456789012345678901234";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Send(String),
    Reply(String),
}

#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().expect("lock").clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|sent| match sent {
                Sent::Send(text) | Sent::Reply(text) => text,
            })
            .collect()
    }

    pub fn sorted_texts(&self) -> Vec<String> {
        let mut texts = self.texts();
        texts.sort();
        texts
    }
}

impl ResponseSink for RecordingSink {
    fn send(&self, text: String) {
        self.sent.lock().expect("lock").push(Sent::Send(text));
    }

    fn reply(&self, text: String) {
        self.sent.lock().expect("lock").push(Sent::Reply(text));
    }
}

#[derive(Clone)]
enum Answer {
    Text(&'static str),
    Exec(&'static str),
    Message(&'static str),
    Unknown,
}

/// Help engine answering from a fixed table of subjects.
pub struct FakeHelp {
    answers: HashMap<&'static str, Answer>,
    queries: Mutex<Vec<String>>,
}

impl FakeHelp {
    pub fn standard() -> Self {
        let answers = HashMap::from([
            ("help", Answer::Text("*help*")),
            ("options", Answer::Text("*options*")),
            (
                "not-existing",
                Answer::Exec("E149: Sorry, no help for not-existing"),
            ),
            ("other-error", Answer::Message("Other Error")),
            ("unknown-error", Answer::Unknown),
        ]);
        Self {
            answers,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("lock").clone()
    }
}

impl HelpSearch for FakeHelp {
    fn search<'a>(&'a self, query: &'a str) -> PortFuture<'a, String> {
        Box::pin(async move {
            self.queries.lock().expect("lock").push(query.to_string());
            match self.answers.get(query).cloned() {
                Some(Answer::Text(text)) => Ok(text.to_string()),
                Some(Answer::Exec(text)) => Err(VimHelpError::exec(Some(1), "", text)),
                Some(Answer::Message(text)) => Err(VimHelpError::message(text)),
                Some(Answer::Unknown) => Err(VimHelpError::Unknown),
                None => Err(VimHelpError::exec(
                    Some(1),
                    "",
                    format!("E149: Sorry, no help for {query}"),
                )),
            }
        })
    }
}

/// Plugin repository keyed on plugin names: `failure` fails every verb,
/// `updated` moves from `HASH_A` to `HASH_B`, everything else succeeds.
#[derive(Default)]
pub struct FakePlugins {
    installed: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakePlugins {
    pub fn with_installed(names: &[&str]) -> Self {
        Self {
            installed: names.iter().map(ToString::to_string).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().expect("lock").clone();
        calls.sort();
        calls
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }
}

impl PluginRepository for FakePlugins {
    fn install<'a>(&'a self, name: &'a str) -> PortFuture<'a, String> {
        Box::pin(async move {
            self.record(format!("install {name}"));
            match name {
                "failure" => Err(VimHelpError::exec(Some(128), "", "ERROR")),
                _ => Ok(HASH_A.to_string()),
            }
        })
    }

    fn uninstall<'a>(&'a self, name: &'a str) -> PortFuture<'a, PathBuf> {
        Box::pin(async move {
            self.record(format!("uninstall {name}"));
            match name {
                "failure" => Err(VimHelpError::message("Plugin is not installed: failure")),
                _ => Ok(PathBuf::from(format!("/plugins/{name}"))),
            }
        })
    }

    fn update<'a>(&'a self, name: &'a str) -> PortFuture<'a, UpdateInfo> {
        Box::pin(async move {
            self.record(format!("update {name}"));
            match name {
                "failure" => Err(VimHelpError::exec(Some(1), "", "ERROR")),
                "updated" => Ok(UpdateInfo::new(name, "/plugins/updated", HASH_A, HASH_B)),
                _ => Ok(UpdateInfo::new(name, format!("/plugins/{name}"), HASH_A, HASH_A)),
            }
        })
    }

    fn plugin_names(&self) -> Vec<String> {
        self.installed.clone()
    }
}

pub struct BotHarness {
    pub bot: VimHelpBot,
    pub help: Arc<FakeHelp>,
    pub plugins: Option<Arc<FakePlugins>>,
}

impl BotHarness {
    pub fn new(config: &BotConfig, plugins: Option<FakePlugins>) -> Self {
        let help = Arc::new(FakeHelp::standard());
        let plugins = plugins.map(Arc::new);
        let bot = VimHelpBot::new(
            config,
            help.clone(),
            plugins
                .clone()
                .map(|plugins| plugins as Arc<dyn PluginRepository>),
        )
        .expect("bot");
        Self { bot, help, plugins }
    }

    pub fn with_plugins(installed: &[&str]) -> Self {
        Self::new(&BotConfig::default(), Some(FakePlugins::with_installed(installed)))
    }

    pub async fn say(&self, text: &str) -> (RecordingSink, Vec<Listener>) {
        self.say_as("bob", text).await
    }

    pub async fn say_as(&self, user: &str, text: &str) -> (RecordingSink, Vec<Listener>) {
        let sink = RecordingSink::default();
        let fired = self.bot.handle(&IncomingMessage::new(user, text), &sink).await;
        (sink, fired)
    }

    pub fn plugin_calls(&self) -> Vec<String> {
        self.plugins
            .as_ref()
            .map(|plugins| plugins.calls())
            .unwrap_or_default()
    }
}
