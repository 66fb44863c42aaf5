/// In-memory fakes for the browser seams, used by unit tests
use crate::courier::{HttpReply, HttpRequest, HttpTransport};
use crate::error::{CourierError, Result};
use crate::inspect::TabLogger;
use crate::tab_data::{TabDetail, TabQuery};
use crate::tabs::TabSource;
use std::cell::RefCell;
use std::collections::VecDeque;

pub struct FakeTabs {
    reply: Result<Vec<TabDetail>>,
    queries: RefCell<Vec<TabQuery>>,
}

impl FakeTabs {
    pub fn with_tabs(tabs: Vec<TabDetail>) -> Self {
        FakeTabs {
            reply: Ok(tabs),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        FakeTabs {
            reply: Err(CourierError::Bridge(message.to_string())),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<TabQuery> {
        self.queries.borrow().clone()
    }
}

impl TabSource for FakeTabs {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabDetail>> {
        self.queries.borrow_mut().push(*query);
        self.reply.clone()
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    lines: RefCell<Vec<(String, Option<String>)>>,
}

impl RecordingLogger {
    pub fn lines(&self) -> Vec<(String, Option<String>)> {
        self.lines.borrow().clone()
    }
}

impl TabLogger for RecordingLogger {
    fn log_field(&self, label: &str, value: Option<&str>) {
        self.lines
            .borrow_mut()
            .push((label.to_string(), value.map(str::to_string)));
    }
}

/// Replays canned replies in order and records every request
#[derive(Default)]
pub struct FakeTransport {
    replies: RefCell<VecDeque<Result<HttpReply>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        let transport = FakeTransport::default();
        transport.push_reply(status, body);
        transport
    }

    pub fn push_reply(&self, status: u16, body: &str) {
        self.replies.borrow_mut().push_back(Ok(HttpReply {
            status,
            body: body.to_string(),
        }));
    }

    pub fn push_error(&self, err: CourierError) {
        self.replies.borrow_mut().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }
}

impl HttpTransport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply> {
        self.requests.borrow_mut().push(request);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(CourierError::Bridge("no reply queued".to_string())))
    }
}
