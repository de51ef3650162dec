//! In-memory fakes shared by the service tests.

use crate::cache::{CacheInterface, MemoryCacheService};
use async_trait::async_trait;
use chrono::Utc;
use jobdesk_core::{JobId, JobdeskError, JobdeskResult, UserId};
use jobdesk_domain::{
    AssociationSchema, Email, EntityKind, FieldFilter, Job, JobStatus, NewJob, NewUser, Record,
    User,
};
use jobdesk_repository::{EntityStore, JobRepository, RepositoryEntityStore, UserRepository};
use jobdesk_search::{SearchIndex, SearchQuery};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Repositories
// =============================================================================

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<BTreeMap<UserId, User>>,
    next_id: AtomicUsize,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> JobdeskResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> JobdeskResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_all(&self, filter: Option<&FieldFilter>) -> JobdeskResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| filter.map_or(true, |f| f.matches(&Record::User((*u).clone()))))
            .cloned()
            .collect())
    }

    async fn exists_by_email(&self, email: &str) -> JobdeskResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.email.as_str().eq_ignore_ascii_case(email)))
    }

    async fn save(&self, user: &NewUser) -> JobdeskResult<User> {
        if self.exists_by_email(user.email.as_str()).await? {
            return Err(JobdeskError::conflict("Duplicate entry for key 'users.email'"));
        }
        let id = UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1);
        let now = Utc::now();
        let saved = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            created_at: now,
            updated_at: now,
            jobs: None,
        };
        self.users.lock().unwrap().insert(id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, user: &User) -> JobdeskResult<User> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&user.id) {
            return Err(JobdeskError::not_found("User", user.id));
        }
        users.insert(user.id, user.detached());
        Ok(user.detached())
    }

    async fn delete(&self, id: UserId) -> JobdeskResult<bool> {
        Ok(self.users.lock().unwrap().remove(&id).is_some())
    }

    async fn delete_all(&self) -> JobdeskResult<u64> {
        let mut users = self.users.lock().unwrap();
        let count = users.len() as u64;
        users.clear();
        Ok(count)
    }
}

/// In-memory job repository; job ids start at 10.
///
/// Holds a handle on the user repository to reject jobs of unknown users,
/// the way the foreign key does.
pub struct InMemoryJobRepository {
    jobs: Mutex<BTreeMap<JobId, Job>>,
    users: Arc<InMemoryUserRepository>,
    next_id: AtomicUsize,
}

impl InMemoryJobRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            jobs: Mutex::new(BTreeMap::new()),
            users,
            next_id: AtomicUsize::new(10),
        }
    }

    async fn check_owner(&self, user_id: UserId) -> JobdeskResult<()> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(JobdeskError::validation(
                "Referenced record does not exist: jobs.user_id",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn find_by_id(&self, id: JobId) -> JobdeskResult<Option<Job>> {
        Ok(self.jobs.lock().unwrap().get(&id).cloned())
    }

    async fn find_all(&self, filter: Option<&FieldFilter>) -> JobdeskResult<Vec<Job>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| filter.map_or(true, |f| f.matches(&Record::Job((*j).clone()))))
            .cloned()
            .collect())
    }

    async fn find_by_user_ids(&self, user_ids: &[UserId]) -> JobdeskResult<Vec<Job>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| user_ids.contains(&j.user_id))
            .cloned()
            .collect())
    }

    async fn save(&self, job: &NewJob) -> JobdeskResult<Job> {
        self.check_owner(job.user_id).await?;
        let id = JobId::new(self.next_id.fetch_add(1, Ordering::SeqCst) as i64);
        let now = Utc::now();
        let saved = Job {
            id,
            title: job.title.clone(),
            description: job.description.clone(),
            status: job.status,
            user_id: job.user_id,
            created_at: now,
            updated_at: now,
            user: None,
        };
        self.jobs.lock().unwrap().insert(id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, job: &Job) -> JobdeskResult<Job> {
        self.check_owner(job.user_id).await?;
        let mut jobs = self.jobs.lock().unwrap();
        if !jobs.contains_key(&job.id) {
            return Err(JobdeskError::not_found("Job", job.id));
        }
        jobs.insert(job.id, job.detached());
        Ok(job.detached())
    }

    async fn delete(&self, id: JobId) -> JobdeskResult<bool> {
        Ok(self.jobs.lock().unwrap().remove(&id).is_some())
    }
}

// =============================================================================
// Entity store
// =============================================================================

/// Entity store over the in-memory repositories that counts its calls.
pub struct CountingStore {
    inner: RepositoryEntityStore,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    pub fn fail_queries(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    fn enter(&self) -> JobdeskResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(JobdeskError::Database("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for CountingStore {
    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: i64,
        associations: &AssociationSchema,
    ) -> JobdeskResult<Option<Record>> {
        self.enter()?;
        self.inner.find_by_id(kind, id, associations).await
    }

    async fn find_all(
        &self,
        kind: EntityKind,
        filter: Option<&FieldFilter>,
        associations: &AssociationSchema,
    ) -> JobdeskResult<Vec<Record>> {
        self.enter()?;
        self.inner.find_all(kind, filter, associations).await
    }
}

// =============================================================================
// Cache
// =============================================================================

/// Memory cache that records writes and can be told to fail.
#[derive(Default)]
pub struct RecordingCache {
    inner: MemoryCacheService,
    writes: Mutex<Vec<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl RecordingCache {
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.read_raw(key).await.unwrap().is_some()
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.inner.read_raw(key).await.unwrap()
    }

    pub async fn put(&self, key: &str, value: &str) {
        self.inner.write_raw(key, value, None).await.unwrap();
    }
}

#[async_trait]
impl CacheInterface for RecordingCache {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn read_raw(&self, key: &str) -> JobdeskResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(JobdeskError::cache("Failed to get Redis connection"));
        }
        self.inner.read_raw(key).await
    }

    async fn write_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> JobdeskResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(JobdeskError::cache("Failed to get Redis connection"));
        }
        self.writes.lock().unwrap().push(key.to_string());
        self.inner.write_raw(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> JobdeskResult<bool> {
        self.inner.delete(key).await
    }

    async fn delete_pattern(&self, pattern: &str) -> JobdeskResult<u64> {
        self.inner.delete_pattern(pattern).await
    }
}

// =============================================================================
// Search index
// =============================================================================

mockall::mock! {
    pub Index {}

    #[async_trait]
    impl SearchIndex for Index {
        async fn search(&self, kind: EntityKind, query: &SearchQuery) -> JobdeskResult<Vec<Value>>;
        async fn index_document(&self, record: &Record) -> JobdeskResult<()>;
        async fn delete_document(&self, kind: EntityKind, id: i64) -> JobdeskResult<()>;
        async fn create_index(&self, kind: EntityKind) -> JobdeskResult<()>;
        async fn delete_index(&self, kind: EntityKind) -> JobdeskResult<()>;
    }
}

impl MockIndex {
    /// A mock that accepts every write and fails every search.
    pub fn accepting_writes() -> Self {
        let mut index = Self::new();
        index.expect_index_document().returning(|_| Ok(()));
        index.expect_delete_document().returning(|_, _| Ok(()));
        index
            .expect_search()
            .returning(|_, _| Err(JobdeskError::search("connection refused")));
        index
    }
}

/// Search index whose search never answers within any sane timeout.
pub struct StalledIndex;

#[async_trait]
impl SearchIndex for StalledIndex {
    async fn search(&self, _kind: EntityKind, _query: &SearchQuery) -> JobdeskResult<Vec<Value>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }

    async fn index_document(&self, _record: &Record) -> JobdeskResult<()> {
        Ok(())
    }

    async fn delete_document(&self, _kind: EntityKind, _id: i64) -> JobdeskResult<()> {
        Ok(())
    }

    async fn create_index(&self, _kind: EntityKind) -> JobdeskResult<()> {
        Ok(())
    }

    async fn delete_index(&self, _kind: EntityKind) -> JobdeskResult<()> {
        Ok(())
    }
}

// =============================================================================
// Fixture
// =============================================================================

/// Repositories, counting store and recording cache wired together.
pub struct Fixture {
    pub users: Arc<InMemoryUserRepository>,
    pub jobs: Arc<InMemoryJobRepository>,
    pub store: Arc<CountingStore>,
    pub cache: Arc<RecordingCache>,
}

impl Fixture {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let jobs = Arc::new(InMemoryJobRepository::new(users.clone()));
        let store = Arc::new(CountingStore {
            inner: RepositoryEntityStore::new(users.clone(), jobs.clone()),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        });
        Self {
            users,
            jobs,
            store,
            cache: Arc::new(RecordingCache::default()),
        }
    }

    /// U1 (id 1) owning J1 (id 10) and J2 (id 11).
    pub async fn with_user_and_two_jobs() -> Self {
        let fixture = Self::new();
        let user = fixture.add_user(1).await;
        fixture.add_job(user.id, JobStatus::Pending).await;
        fixture.add_job(user.id, JobStatus::InProgress).await;
        fixture.store.reset_calls();
        fixture
    }

    pub async fn add_user(&self, n: i64) -> User {
        self.users
            .save(&NewUser {
                name: format!("User {n}"),
                email: Email::new_unchecked(format!("user{n}@example.com")),
                phone: "123-456-7890".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn add_job(&self, user_id: UserId, status: JobStatus) -> Job {
        self.jobs
            .save(&NewJob {
                title: "Job Title".to_string(),
                description: "Job Description".to_string(),
                status,
                user_id,
            })
            .await
            .unwrap()
    }
}
