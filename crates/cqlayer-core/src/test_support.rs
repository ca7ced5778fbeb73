//! Fixtures shared by the crate's unit tests.

use crate::{
    catalog::{InMemoryCatalog, NativeType, TableSchema},
    config::ClusterConfig,
    model::{
        EnumModel, EnumValue, FieldKind, FieldModel, FieldValue, Record, RecordModel, decode,
        enum_from_value, enum_to_value,
    },
    statement::Statement,
    transport::{Row, Transport, TransportConnector, TransportError},
    value::{TypeRef, Value},
};
use std::{
    collections::{BTreeSet, VecDeque},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

///
/// Status
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Active,
    Pending,
    Banned,
}

static STATUS_MODEL: EnumModel = EnumModel {
    path: "fixture::Status",
    variants: &["ACTIVE", "PENDING", "BANNED"],
};

impl EnumValue for Status {
    const MODEL: &'static EnumModel = &STATUS_MODEL;

    fn variant(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Pending => "PENDING",
            Self::Banned => "BANNED",
        }
    }

    fn from_variant(label: &str) -> Option<Self> {
        match label {
            "ACTIVE" => Some(Self::Active),
            "PENDING" => Some(Self::Pending),
            "BANNED" => Some(Self::Banned),
            _ => None,
        }
    }
}

///
/// Handler
/// Marker type stored in the `handler` type-reference column.
///

pub struct Handler;

///
/// UserProfile
///
/// `nickname` has no backing column.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserProfile {
    pub tenant_id: i64,
    pub user_id: i64,
    pub display_name: String,
    pub status: Option<Status>,
    pub tags: BTreeSet<String>,
    pub handler: Option<TypeRef>,
    pub nickname: Option<String>,
}

impl UserProfile {
    pub fn new(tenant_id: i64, user_id: i64, display_name: &str) -> Self {
        Self {
            tenant_id,
            user_id,
            display_name: display_name.to_string(),
            ..Self::default()
        }
    }
}

static USER_PROFILE_FIELDS: [FieldModel<UserProfile>; 7] = [
    FieldModel {
        name: "tenantId",
        kind: FieldKind::Scalar,
        get: |r| r.tenant_id.to_value(),
        set: |r, v| {
            r.tenant_id = decode("tenantId", &v)?;
            Ok(())
        },
    },
    FieldModel {
        name: "userId",
        kind: FieldKind::Scalar,
        get: |r| r.user_id.to_value(),
        set: |r, v| {
            r.user_id = decode("userId", &v)?;
            Ok(())
        },
    },
    FieldModel {
        name: "displayName",
        kind: FieldKind::Scalar,
        get: |r| r.display_name.to_value(),
        set: |r, v| {
            r.display_name = decode("displayName", &v)?;
            Ok(())
        },
    },
    FieldModel {
        name: "status",
        kind: FieldKind::Enum(&STATUS_MODEL),
        get: |r| r.status.as_ref().map_or(Value::Null, enum_to_value),
        set: |r, v| {
            r.status = Some(enum_from_value("status", &v)?);
            Ok(())
        },
    },
    FieldModel {
        name: "tags",
        kind: FieldKind::Scalar,
        get: |r| r.tags.to_value(),
        set: |r, v| {
            r.tags = decode("tags", &v)?;
            Ok(())
        },
    },
    FieldModel {
        name: "handler",
        kind: FieldKind::TypeRef,
        get: |r| r.handler.to_value(),
        set: |r, v| {
            r.handler = decode("handler", &v)?;
            Ok(())
        },
    },
    FieldModel {
        name: "nickname",
        kind: FieldKind::Scalar,
        get: |r| r.nickname.to_value(),
        set: |r, v| {
            r.nickname = decode("nickname", &v)?;
            Ok(())
        },
    },
];

static USER_PROFILE_MODEL: RecordModel<UserProfile> = RecordModel {
    resource: "userProfile",
    fields: &USER_PROFILE_FIELDS,
};

impl Record for UserProfile {
    fn model() -> &'static RecordModel<Self> {
        &USER_PROFILE_MODEL
    }
}

/// Catalog with the `user_profile` table.
pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new().with_table(
        TableSchema::new("user_profile")
            .partition_key("tenant_id", NativeType::BigInt)
            .clustering_key("user_id", NativeType::BigInt)
            .column("display_name", NativeType::Text)
            .column("status", NativeType::Text)
            .column("tags", NativeType::Set(Box::new(NativeType::Text)))
            .column("handler", NativeType::Text)
            .index("status")
            .index("values(tags)"),
    )
}

pub fn config() -> ClusterConfig {
    ClusterConfig {
        keyspace: "accounts".to_string(),
        ..ClusterConfig::default()
    }
}

/// Native row as the store would return it for `user_profile`.
pub fn user_row(tenant_id: i64, user_id: i64, display_name: &str, status: &str) -> Row {
    Row::from_iter([
        ("tenant_id", Value::Int(tenant_id)),
        ("user_id", Value::Int(user_id)),
        ("display_name", Value::from(display_name)),
        ("status", Value::from(status)),
    ])
}

type FailWhen = Box<dyn Fn(&Statement) -> bool + Send + Sync>;

///
/// RecordingTransport
///
/// Records every statement it is asked to execute and answers with
/// scripted row batches, in order. Statements matching `fail_when` are
/// rejected.
///

#[derive(Default)]
pub struct RecordingTransport {
    executed: Mutex<Vec<Statement>>,
    responses: Mutex<VecDeque<Vec<Row>>>,
    fail_when: Option<FailWhen>,
    closed: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn respond(self, rows: Vec<Row>) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(rows);
        self
    }

    #[must_use]
    pub fn failing_when(mut self, predicate: impl Fn(&Statement) -> bool + Send + Sync + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn executed_cql(&self) -> Vec<String> {
        self.executed()
            .iter()
            .map(|statement| statement.cql().to_string())
            .collect()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, statement: &Statement) -> Result<Vec<Row>, TransportError> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(statement.clone());

        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        if let Some(fail_when) = &self.fail_when
            && fail_when(statement)
        {
            return Err(TransportError::Rejected {
                message: format!("scripted failure for {}", statement.cql()),
            });
        }

        Ok(self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_default())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

///
/// RecordingConnector
/// Hands out a fresh `RecordingTransport` per connect and counts connects.
///

#[derive(Default)]
pub struct RecordingConnector {
    connects: AtomicUsize,
    transports: Mutex<Vec<Arc<RecordingTransport>>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<Arc<RecordingTransport>> {
        self.transports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl TransportConnector for RecordingConnector {
    fn connect(&self, config: &ClusterConfig) -> Result<Arc<dyn Transport>, TransportError> {
        if config.contact_points.is_empty() {
            return Err(TransportError::Connect {
                message: "no contact points".to_string(),
            });
        }

        self.connects.fetch_add(1, Ordering::SeqCst);
        let transport = Arc::new(RecordingTransport::new());
        self.transports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(transport.clone());

        Ok(transport)
    }
}
