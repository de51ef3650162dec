//! Entity store over the user and job repositories.

use crate::traits::{EntityStore, JobRepository, UserRepository};
use async_trait::async_trait;
use jobdesk_core::{JobId, JobdeskResult, UserId};
use jobdesk_domain::{
    Association, AssociationSchema, EntityKind, FieldFilter, Job, Record, User,
};
use shaku::Component;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// [`EntityStore`] that composes the typed repositories and attaches
/// associations with one extra batched query per association.
#[derive(Component)]
#[shaku(interface = EntityStore)]
pub struct RepositoryEntityStore {
    #[shaku(inject)]
    users: Arc<dyn UserRepository>,

    #[shaku(inject)]
    jobs: Arc<dyn JobRepository>,
}

impl RepositoryEntityStore {
    /// Creates a new entity store.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, jobs: Arc<dyn JobRepository>) -> Self {
        Self { users, jobs }
    }

    async fn attach_jobs(&self, mut users: Vec<User>) -> JobdeskResult<Vec<User>> {
        let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
        let mut by_owner: HashMap<UserId, Vec<Job>> = HashMap::new();
        for job in self.jobs.find_by_user_ids(&ids).await? {
            by_owner.entry(job.user_id).or_default().push(job);
        }
        for user in &mut users {
            user.jobs = Some(by_owner.remove(&user.id).unwrap_or_default());
        }
        Ok(users)
    }

    async fn attach_users(&self, mut jobs: Vec<Job>) -> JobdeskResult<Vec<Job>> {
        let ids: Vec<UserId> = jobs
            .iter()
            .map(|j| j.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let owners: HashMap<UserId, User> = self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        for job in &mut jobs {
            job.user = owners.get(&job.user_id).cloned().map(Box::new);
        }
        Ok(jobs)
    }

    async fn load_users(
        &self,
        users: Vec<User>,
        associations: &AssociationSchema,
    ) -> JobdeskResult<Vec<Record>> {
        let users = if associations.includes(Association::Jobs) {
            self.attach_jobs(users).await?
        } else {
            users
        };
        Ok(users.into_iter().map(Record::User).collect())
    }

    async fn load_jobs(
        &self,
        jobs: Vec<Job>,
        associations: &AssociationSchema,
    ) -> JobdeskResult<Vec<Record>> {
        let jobs = if associations.includes(Association::User) {
            self.attach_users(jobs).await?
        } else {
            jobs
        };
        Ok(jobs.into_iter().map(Record::Job).collect())
    }
}

#[async_trait]
impl EntityStore for RepositoryEntityStore {
    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: i64,
        associations: &AssociationSchema,
    ) -> JobdeskResult<Option<Record>> {
        debug!("Loading {}:{} with {:?}", kind, id, associations);

        let loaded = match kind {
            EntityKind::User => match self.users.find_by_id(UserId::new(id)).await? {
                Some(user) => self.load_users(vec![user], associations).await?,
                None => Vec::new(),
            },
            EntityKind::Job => match self.jobs.find_by_id(JobId::new(id)).await? {
                Some(job) => self.load_jobs(vec![job], associations).await?,
                None => Vec::new(),
            },
        };

        Ok(loaded.into_iter().next())
    }

    async fn find_all(
        &self,
        kind: EntityKind,
        filter: Option<&FieldFilter>,
        associations: &AssociationSchema,
    ) -> JobdeskResult<Vec<Record>> {
        debug!("Loading all {} records, filter: {:?}", kind, filter);

        match kind {
            EntityKind::User => {
                let users = self.users.find_all(filter).await?;
                self.load_users(users, associations).await
            }
            EntityKind::Job => {
                let jobs = self.jobs.find_all(filter).await?;
                self.load_jobs(jobs, associations).await
            }
        }
    }
}

impl std::fmt::Debug for RepositoryEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryEntityStore").finish_non_exhaustive()
    }
}
