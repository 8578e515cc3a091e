#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use batchsvc_rs::{
    async_trait, BatchError, BatchResult, ListOptions, NextLink, NextPageOptions, Page,
    PageFetcher, ServiceError,
};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        if let Ok(guard) = init_tracing_opentelemetry::TracingConfig::testing().init_subscriber() {
            std::mem::forget(guard);
        }
    });
}

/// What the fake service answers for one page.
#[derive(Debug, Clone)]
pub enum Reply {
    Page(Vec<&'static str>, Option<&'static str>),
    Fail(u16),
}

/// A request the fake service received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    First(ListOptions),
    Next(String, NextPageOptions),
}

/// Page fetcher answering from a fixed script, keyed by next link.
///
/// The first page is keyed by `None`. Every request is recorded.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    replies: Arc<HashMap<Option<String>, Reply>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedFetcher {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = (Option<&'static str>, Reply)>,
    {
        Self {
            replies: Arc::new(
                replies
                    .into_iter()
                    .map(|(key, reply)| (key.map(str::to_string), reply))
                    .collect(),
            ),
            calls: Arc::default(),
        }
    }

    /// A listing of `pages` pages with `per_page` items each, linked `p2`, `p3`, ...
    pub fn linear(pages: usize, per_page: usize) -> Self {
        let names: &'static [&'static str] = &["p2", "p3", "p4", "p5", "p6", "p7", "p8", "p9"];
        let items: &'static [&'static str] = &["a", "b", "c", "d", "e"];
        assert!(pages >= 1 && pages <= names.len() + 1);
        assert!(per_page <= items.len());

        let mut replies = Vec::new();
        for index in 0..pages {
            let key = if index == 0 { None } else { Some(names[index - 1]) };
            let next = names.get(index).copied().filter(|_| index + 1 < pages);
            replies.push((key, Reply::Page(items[..per_page].to_vec(), next)));
        }
        Self::new(replies)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn answer(&self, key: Option<String>, call: Call) -> BatchResult<Page<String>> {
        self.calls.lock().unwrap().push(call);
        match self.replies.get(&key) {
            Some(Reply::Page(items, next)) => Ok(Page::new(
                items.iter().map(|item| item.to_string()).collect(),
                next.map(NextLink::from),
            )),
            Some(Reply::Fail(status)) => Err(BatchError::Service(ServiceError::from_body(
                *status,
                r#"{"code":"InternalError","message":"scripted failure"}"#,
            ))),
            None => panic!("unexpected request for {key:?}"),
        }
    }
}

#[async_trait]
impl PageFetcher<String> for ScriptedFetcher {
    async fn fetch_first(&self, options: &ListOptions) -> BatchResult<Page<String>> {
        self.answer(None, Call::First(options.clone()))
    }

    async fn fetch_next(
        &self,
        next_link: &NextLink,
        options: &NextPageOptions,
    ) -> BatchResult<Page<String>> {
        self.answer(
            Some(next_link.as_str().to_string()),
            Call::Next(next_link.as_str().to_string(), options.clone()),
        )
    }
}
