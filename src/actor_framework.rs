use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::query::{Direction, Page, PageRequest, Predicate, Sort};
use crate::schema::Schema;

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any record must implement to be stored by a [`ResourceActor`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// Static field table used for filtering and sorting.
    fn schema() -> &'static Schema<Self>;

    /// Internal surrogate key; `None` until the first save.
    fn key(&self) -> Option<u64>;

    fn assign_key(&mut self, key: u64);

    /// Externally visible identity. Unique across the store.
    fn public_id(&self) -> &str;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Constraint violation: {0}")]
    Conflict(String),
    #[error("No record with key {0}")]
    MissingKey(u64),
    #[error("Cannot sort by {0}")]
    UnsortableField(String),
    #[error("Store unavailable")]
    Unavailable,
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Save {
        entity: T,
        respond_to: Response<T>,
    },
    FindByPublicId {
        public_id: String,
        respond_to: Response<Option<T>>,
    },
    DeleteByKey {
        key: u64,
        respond_to: Response<()>,
    },
    FindAll {
        predicate: Predicate,
        page: PageRequest,
        respond_to: Response<Page<T>>,
    },
    FindByPublicIdIn {
        ids: Vec<String>,
        page: PageRequest,
        respond_to: Response<Page<T>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns every record of one entity type and processes requests one at a time,
/// so writes to a record are serialized. Behaves like a single table with an
/// auto-increment key and a unique index on the public identifier.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    rows: BTreeMap<u64, T>,
    public_index: HashMap<String, u64>,
    next_key: u64,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            rows: BTreeMap::new(),
            public_index: HashMap::new(),
            next_key: 1,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs until every client has been dropped.
    #[instrument(name = "resource_actor", skip(self), fields(entity = T::schema().entity()))]
    pub async fn run(mut self) {
        info!("Store starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Save { entity, respond_to } => {
                    let _ = respond_to.send(self.handle_save(entity));
                }
                ResourceRequest::FindByPublicId { public_id, respond_to } => {
                    let found = self
                        .public_index
                        .get(&public_id)
                        .and_then(|key| self.rows.get(key))
                        .cloned();
                    let _ = respond_to.send(Ok(found));
                }
                ResourceRequest::DeleteByKey { key, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(key));
                }
                ResourceRequest::FindAll {
                    predicate,
                    page,
                    respond_to,
                } => {
                    let schema = T::schema();
                    let rows = self
                        .rows
                        .values()
                        .filter(|row| predicate.matches(schema, *row))
                        .cloned()
                        .collect();
                    let _ = respond_to.send(self.ordered_page(rows, &page));
                }
                ResourceRequest::FindByPublicIdIn { ids, page, respond_to } => {
                    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
                    let rows = self
                        .rows
                        .values()
                        .filter(|row| wanted.contains(row.public_id()))
                        .cloned()
                        .collect();
                    let _ = respond_to.send(self.ordered_page(rows, &page));
                }
            }
        }
        info!("Store stopped");
    }

    #[instrument(skip(self, entity), fields(public_id = %entity.public_id(), key = ?entity.key()))]
    fn handle_save(&mut self, mut entity: T) -> Result<T, StoreError> {
        let public_id = entity.public_id().to_string();
        let owner = self.public_index.get(&public_id).copied();

        let key = match entity.key() {
            Some(key) => {
                let existing = self.rows.get(&key).ok_or_else(|| {
                    warn!("Save targets a missing row");
                    StoreError::MissingKey(key)
                })?;
                if existing.public_id() != public_id {
                    warn!("Rejected change of public identifier");
                    return Err(StoreError::Conflict(format!(
                        "public identifier of row {} is immutable",
                        key
                    )));
                }
                key
            }
            None => {
                if owner.is_some() {
                    warn!("Rejected duplicate public identifier");
                    return Err(StoreError::Conflict(format!(
                        "public identifier {} already exists",
                        public_id
                    )));
                }
                let key = self.next_key;
                self.next_key += 1;
                entity.assign_key(key);
                key
            }
        };

        self.public_index.insert(public_id, key);
        self.rows.insert(key, entity.clone());
        debug!(key, "Row saved");
        Ok(entity)
    }

    #[instrument(skip(self))]
    fn handle_delete(&mut self, key: u64) -> Result<(), StoreError> {
        let row = self.rows.remove(&key).ok_or(StoreError::MissingKey(key))?;
        self.public_index.remove(row.public_id());
        debug!("Row deleted");
        Ok(())
    }

    fn ordered_page(&self, mut rows: Vec<T>, page: &PageRequest) -> Result<Page<T>, StoreError> {
        sort_rows(T::schema(), &mut rows, &page.sort)?;
        Ok(Page::slice(rows, page))
    }
}

/// Stable sort, so rows with equal sort values keep key order.
fn sort_rows<T>(schema: &Schema<T>, rows: &mut [T], sort: &Sort) -> Result<(), StoreError> {
    let field = schema
        .field(&sort.field)
        .filter(|field| field.is_sortable())
        .ok_or_else(|| {
            warn!(field = %sort.field, "Rejected sort on a non-sortable field");
            StoreError::UnsortableField(sort.field.clone())
        })?;
    rows.sort_by(|a, b| {
        let ordering = field
            .read(a)
            .compare(&field.read(b))
            .unwrap_or(std::cmp::Ordering::Equal);
        match sort.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    });
    Ok(())
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Debug)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(&self, build: impl FnOnce(Response<R>) -> ResourceRequest<T>) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::Unavailable)?;
        response.await.map_err(|_| StoreError::Unavailable)?
    }

    /// Inserts a record without a key, or replaces the row with the same key.
    pub async fn save(&self, entity: T) -> Result<T, StoreError> {
        self.request(|respond_to| ResourceRequest::Save { entity, respond_to })
            .await
    }

    pub async fn find_by_public_id(&self, public_id: impl Into<String>) -> Result<Option<T>, StoreError> {
        let public_id = public_id.into();
        self.request(|respond_to| ResourceRequest::FindByPublicId { public_id, respond_to })
            .await
    }

    pub async fn delete_by_key(&self, key: u64) -> Result<(), StoreError> {
        self.request(|respond_to| ResourceRequest::DeleteByKey { key, respond_to })
            .await
    }

    pub async fn find_all(&self, predicate: Predicate, page: PageRequest) -> Result<Page<T>, StoreError> {
        self.request(|respond_to| ResourceRequest::FindAll {
            predicate,
            page,
            respond_to,
        })
        .await
    }

    pub async fn find_by_public_id_in(&self, ids: Vec<String>, page: PageRequest) -> Result<Page<T>, StoreError> {
        self.request(|respond_to| ResourceRequest::FindByPublicIdIn { ids, page, respond_to })
            .await
    }
}

// =============================================================================
// 5. TESTS
// =============================================================================
