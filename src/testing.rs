//! Test doubles shared by the flow tests

use crate::request::{Answer, Transport};
use crate::session::App;
use serde_json::json;
use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// A request as seen by [`ScriptedTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub params: Vec<(String, String)>,
}

enum Scripted {
    Ready(Answer),
    Deferred(oneshot::Receiver<Answer>),
}

/// Transport that replays scripted answers in call order.
///
/// The script entry is taken when the request is issued, not when it
/// resolves, so deferred answers can be released in any order.
#[derive(Default)]
pub struct ScriptedTransport {
    calls: Mutex<Vec<Call>>,
    script: Mutex<VecDeque<Scripted>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, answer: Answer) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Ready(answer));
        self
    }

    /// Queue an answer released later through the returned sender
    pub fn deferred(&self) -> oneshot::Sender<Answer> {
        let (tx, rx) = oneshot::channel();
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Deferred(rx));
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until at least `n` requests have been issued
    pub async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.calls.lock().unwrap().len() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("requests were not issued in time");
    }

    fn issue(
        &self,
        method: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> impl Future<Output = Answer> + Send {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
        let next = self.script.lock().unwrap().pop_front();

        async move {
            match next {
                Some(Scripted::Ready(answer)) => answer,
                Some(Scripted::Deferred(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Answer::Bad(json!("deferred answer dropped"))),
                None => Answer::Bad(json!("unscripted request")),
            }
        }
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, path: &str, params: &[(&str, String)]) -> impl Future<Output = Answer> + Send {
        self.issue("GET", path, params)
    }

    fn post(&self, path: &str, form: &[(&str, String)]) -> impl Future<Output = Answer> + Send {
        self.issue("POST", path, form)
    }
}

/// App that records every login it is asked to make
#[derive(Default)]
pub struct RecordingApp {
    logins: Mutex<Vec<(String, String)>>,
    refuse: bool,
}

impl RecordingApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// An app whose `make_login` always fails
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn logins(&self) -> Vec<(String, String)> {
        self.logins.lock().unwrap().clone()
    }
}

impl App for RecordingApp {
    fn make_login(&self, name: &str, sid: &str) -> anyhow::Result<()> {
        self.logins
            .lock()
            .unwrap()
            .push((name.to_string(), sid.to_string()));
        if self.refuse {
            anyhow::bail!("login storage unavailable");
        }
        Ok(())
    }
}

/// Shared in-memory log sink, usable as a `fmt` layer writer
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
