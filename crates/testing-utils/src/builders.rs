//! Test data builders with sensible defaults

use chrono::{DateTime, Utc};
use netmon_core::models::{
    CrontabEntry, CrontabStatus, ElementType, HandlerKind, Node, Recurrence, Request,
    RequestGroup, RequestType,
};

pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(ip_address: &str) -> Self {
        Self {
            node: Node::new(format!("node-{ip_address}"), ip_address),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.node.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.node.name = name.to_string();
        self
    }

    pub fn with_community(mut self, community: &str) -> Self {
        self.node.community = community.to_string();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: i32) -> Self {
        self.node.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn unmanaged(mut self) -> Self {
        self.node.manage = false;
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}

pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn get(name: &str, oid: &str) -> Self {
        Self {
            request: Request::new(name, oid, RequestType::Get),
        }
    }

    pub fn walk(name: &str, oid: &str) -> Self {
        Self {
            request: Request::new(name, oid, RequestType::Walk),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.request.id = id;
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.request.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_postfix(mut self, postfix: &str) -> Self {
        self.request.postfix = Some(postfix.to_string());
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}

pub struct RequestGroupBuilder {
    group: RequestGroup,
}

impl RequestGroupBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            group: RequestGroup::new(name, HandlerKind::Snmp, ElementType::Generic),
        }
    }

    pub fn interfaces() -> Self {
        Self::new("interfaces")
            .with_handler(HandlerKind::InterfaceDiscovery)
            .with_element_type(ElementType::Interface)
            .full_walk()
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.group.id = id;
        self
    }

    pub fn with_handler(mut self, handler: HandlerKind) -> Self {
        self.group.handler = handler;
        self
    }

    pub fn with_element_type(mut self, element_type: ElementType) -> Self {
        self.group.element_type = element_type;
        self
    }

    pub fn full_walk(mut self) -> Self {
        self.group.full_walk = true;
        self
    }

    pub fn unmanaged(mut self) -> Self {
        self.group.manage = false;
        self
    }

    pub fn build(self) -> RequestGroup {
        self.group
    }
}

pub struct CrontabEntryBuilder {
    entry: CrontabEntry,
}

impl CrontabEntryBuilder {
    pub fn new(task_id: i64) -> Self {
        Self {
            entry: CrontabEntry::new(task_id, Recurrence::every_minutes(5)),
        }
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.entry.minutes = recurrence.minutes;
        self.entry.hours = recurrence.hours;
        self.entry.days = recurrence.days;
        self
    }

    pub fn with_agent(mut self, agent: &str) -> Self {
        self.entry.agent = Some(agent.to_string());
        self
    }

    pub fn last_run_at(mut self, lastdt: DateTime<Utc>) -> Self {
        self.entry.lastdt = Some(lastdt);
        self
    }

    pub fn starting_at(mut self, startdt: DateTime<Utc>) -> Self {
        self.entry.startdt = Some(startdt);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.entry.status = CrontabStatus::Inactive;
        self
    }

    pub fn build(self) -> CrontabEntry {
        self.entry
    }
}
