
use serenity::model::id::GuildId;
use tokio::sync::Mutex;
use uuid::Uuid;

use std::collections::HashMap;
use std::sync::Arc;

use crate::applications::config::ConfigStore;
use crate::applications::error::ReviewError;
use crate::applications::model::*;
use crate::applications::panel::Panel;
use crate::applications::render::{self, Affordance, Content, Viewer};
use crate::applications::services::{InputCollector, MembershipMutator, Notifier, RoleOutcome};
use crate::utility::Logger;


/// Returned by a successful claim.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    AlreadyHeld,
    Reclaimed { previous: ReviewerId },
}

/// Returned by a successful accept or reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionReport {
    pub reference: ApplicationRef,
    pub guild_id: GuildId,
    pub panel: String,
    pub status: ApplicationStatus,
    pub roles: Vec<RoleOutcome>,
    pub notice_posted: bool,
}

impl DecisionReport {
    pub fn failed_roles(&self) -> Vec<&RoleOutcome> {
        self.roles.iter().filter(|outcome| !outcome.is_ok()).collect()
    }
}

struct ApplicationEntry {
    application: Application,
    lock: ReviewLock,
    decided_at: Option<i64>,
}

/// How long a decided application stays around for its stale buttons.
const DECIDED_RETENTION_SECS: i64 = 24 * 60 * 60;

// a slot is created on the first submit of an applicant and stays empty
// until that submit has posted its review card
type Slot = Arc<Mutex<Option<ApplicationEntry>>>;

/// Owns every application and its review lock. All checks and transitions
/// of one applicant run under that applicant's slot mutex, different
/// applicants never wait on each other.
pub struct ApplicationReviewWorkflow {
    slots: Mutex<HashMap<ApplicantId, Slot>>,
    configs: ConfigStore,
    notifier: Arc<dyn Notifier>,
    members: Arc<dyn MembershipMutator>,
}

impl ApplicationReviewWorkflow {

    pub fn new(notifier: Arc<dyn Notifier>, members: Arc<dyn MembershipMutator>) -> Self {
        ApplicationReviewWorkflow {
            slots: Mutex::new(HashMap::new()),
            configs: ConfigStore::new(),
            notifier,
            members,
        }
    }

    pub fn configs(&self) -> &ConfigStore {
        &self.configs
    }

    async fn slot(&self, applicant: ApplicantId) -> Option<Slot> {
        self.slots.lock().await.get(&applicant).cloned()
    }

    async fn slot_or_insert(&self, applicant: ApplicantId) -> Slot {
        let mut slots = self.slots.lock().await;
        Self::prune_locked(&mut slots, chrono::Utc::now().timestamp() - DECIDED_RETENTION_SECS);
        Arc::clone(slots.entry(applicant).or_default())
    }

    /// Drops slots decided at or before `cutoff` and slots left empty by a
    /// failed submit. Returns how many were dropped.
    pub async fn prune_decided(&self, cutoff: i64) -> usize {
        let mut slots = self.slots.lock().await;
        Self::prune_locked(&mut slots, cutoff)
    }

    // clones of a slot are only handed out under the map lock, so a slot
    // nobody else holds cannot be picked up while it is dropped
    fn prune_locked(slots: &mut HashMap<ApplicantId, Slot>, cutoff: i64) -> usize {
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => match entry.as_ref() {
                    None => false,
                    Some(entry) => !entry.decided_at.is_some_and(|decided_at| decided_at <= cutoff),
                },
                Err(_) => true,
            }
        });
        before - slots.len()
    }

    fn entry_mut<'e>(slot: &'e mut Option<ApplicationEntry>, reference: &ApplicationRef)
        -> Result<&'e mut ApplicationEntry, ReviewError>
    {
        slot.as_mut()
            .filter(|entry| entry.application.id == reference.application_id)
            .ok_or(ReviewError::UnknownApplication)
    }

    async fn rerender(&self, entry: &ApplicationEntry) -> bool {
        let notification = match entry.application.notification {
            Some(notification) => notification,
            None => return false,
        };
        let (content, affordances) = render::review_card(&entry.application, &entry.lock, Viewer::Public);
        match self.notifier.update(notification, &content, &affordances).await {
            Ok(_) => true,
            Err(err) => {
                Logger::warn_long(
                    &format!("Failed to re-render application {}", entry.application.reference()),
                    &err.to_string());
                false
            }
        }
    }

    /// Fails early for applicants who could not submit right now, so they
    /// are not asked to fill a form for nothing.
    pub async fn check_can_submit(&self, guild: GuildId, applicant: ApplicantId) -> Result<(), ReviewError> {
        if self.configs.get(guild).await.review_channel.is_none() {
            return Err(ReviewError::NotConfigured);
        }
        if let Some(slot) = self.slot(applicant).await {
            if let Some(entry) = slot.lock().await.as_ref() {
                if entry.application.status == ApplicationStatus::Pending {
                    return Err(ReviewError::AlreadyPending);
                }
            }
        }
        Ok(())
    }

    pub async fn submit(&self,
                        guild: GuildId,
                        panel: &str,
                        applicant: ApplicantId,
                        answers: Vec<Answer>) -> Result<ApplicationRef, ReviewError>
    {
        let review_channel = self.configs.get(guild).await.review_channel
            .ok_or(ReviewError::NotConfigured)?;

        let slot = self.slot_or_insert(applicant).await;
        let mut slot = slot.lock().await;
        if let Some(entry) = slot.as_ref() {
            if entry.application.status == ApplicationStatus::Pending {
                return Err(ReviewError::AlreadyPending);
            }
        }

        let mut entry = ApplicationEntry {
            application: Application {
                id: Uuid::new_v4(),
                guild_id: guild,
                panel: panel.to_string(),
                applicant_id: applicant,
                answers,
                status: ApplicationStatus::Pending,
                decided_by: None,
                notification: None,
                submitted_at: chrono::Utc::now().timestamp(),
            },
            lock: ReviewLock::default(),
            decided_at: None,
        };

        let (content, affordances) = render::review_card(&entry.application, &entry.lock, Viewer::Public);
        let notification = self.notifier.post(review_channel, &content, &affordances).await
            .map_err(|err| ReviewError::NotificationFailed(err.to_string()))?;
        entry.application.notification = Some(notification);

        let reference = entry.application.reference();
        *slot = Some(entry);

        #[cfg(feature = "debug")]
        Logger::info_long("Application submitted", &reference.to_string());

        Ok(reference)
    }

    /// Runs the panel's form through `collector` and submits the answers.
    /// `Ok(None)` means the applicant cancelled.
    pub async fn submit_with(&self,
                             collector: &dyn InputCollector,
                             guild: GuildId,
                             panel: &Panel,
                             applicant: ApplicantId) -> Result<Option<ApplicationRef>, ReviewError>
    {
        self.check_can_submit(guild, applicant).await?;
        let answers = match collector.collect(panel.title, panel.questions).await {
            Some(answers) => answers,
            None => return Ok(None),
        };
        self.submit(guild, panel.id, applicant, answers).await.map(Some)
    }

    pub async fn claim(&self, reference: ApplicationRef, reviewer: ReviewerId) -> Result<ClaimOutcome, ReviewError> {

        let slot = self.slot(reference.applicant_id).await
            .ok_or(ReviewError::UnknownApplication)?;
        let mut slot = slot.lock().await;
        let entry = Self::entry_mut(&mut slot, &reference)?;

        if entry.application.status.is_terminal() {
            return Err(ReviewError::NotPending(entry.application.status));
        }

        let now = chrono::Utc::now().timestamp();
        let outcome = match entry.lock.holder_id {
            Some(holder) if holder == reviewer => ClaimOutcome::AlreadyHeld,
            Some(holder) => {
                let timeout = self.configs.get(entry.application.guild_id).await.claim_timeout_secs;
                if !entry.lock.is_expired(timeout, now) {
                    return Err(ReviewError::AlreadyLocked { holder });
                }
                Logger::info_long(
                    &format!("Reclaiming abandoned application {}", reference),
                    &format!("{} -> {}", holder, reviewer));
                ClaimOutcome::Reclaimed { previous: holder }
            },
            None => ClaimOutcome::Claimed,
        };

        // re-claiming keeps the claim time and counts as activity
        match outcome {
            ClaimOutcome::AlreadyHeld => entry.lock.touch(now),
            _ => entry.lock.set(reviewer, now),
        }
        self.rerender(entry).await;
        Ok(outcome)
    }

    /// Gives a claim back. Only the holder may do so unless `force` is set.
    /// Returns the previous holder, `None` if nobody held the claim.
    pub async fn release(&self,
                         reference: ApplicationRef,
                         actor: ReviewerId,
                         force: bool) -> Result<Option<ReviewerId>, ReviewError>
    {
        let slot = self.slot(reference.applicant_id).await
            .ok_or(ReviewError::UnknownApplication)?;
        let mut slot = slot.lock().await;
        let entry = Self::entry_mut(&mut slot, &reference)?;

        if entry.application.status.is_terminal() {
            return Err(ReviewError::NotPending(entry.application.status));
        }
        let previous = entry.lock.holder_id;
        match previous {
            None => return Ok(None),
            Some(holder) if holder != actor && !force => return Err(ReviewError::NotHolder),
            Some(_) => {}
        }

        entry.lock.clear();
        self.rerender(entry).await;
        Ok(previous)
    }

    /// Read-only version of the holder check done by accept, reject and
    /// request-info.
    pub async fn check_holder(&self, reference: ApplicationRef, reviewer: ReviewerId) -> Result<(), ReviewError> {
        let slot = self.slot(reference.applicant_id).await
            .ok_or(ReviewError::UnknownApplication)?;
        let mut slot = slot.lock().await;
        let entry = Self::entry_mut(&mut slot, &reference)?;
        Self::guard_holder(entry, reviewer)
    }

    fn guard_holder(entry: &ApplicationEntry, reviewer: ReviewerId) -> Result<(), ReviewError> {
        if entry.application.status.is_terminal() {
            return Err(ReviewError::NotPending(entry.application.status));
        }
        if !entry.lock.is_held_by(reviewer) {
            return Err(ReviewError::NotHolder);
        }
        Ok(())
    }

    pub async fn accept(&self, reference: ApplicationRef, reviewer: ReviewerId) -> Result<DecisionReport, ReviewError> {
        self.decide(reference, reviewer, ApplicationStatus::Accepted).await
    }

    pub async fn reject(&self, reference: ApplicationRef, reviewer: ReviewerId) -> Result<DecisionReport, ReviewError> {
        self.decide(reference, reviewer, ApplicationStatus::Rejected).await
    }

    async fn decide(&self,
                    reference: ApplicationRef,
                    reviewer: ReviewerId,
                    status: ApplicationStatus) -> Result<DecisionReport, ReviewError>
    {
        let slot = self.slot(reference.applicant_id).await
            .ok_or(ReviewError::UnknownApplication)?;
        let mut slot = slot.lock().await;
        let entry = Self::entry_mut(&mut slot, &reference)?;
        Self::guard_holder(entry, reviewer)?;

        #[cfg(feature = "debug")]
        let logstr = &format!("Deciding application {} ({})", reference, status);
        #[cfg(feature = "debug")]
        Logger::info_long("Start", logstr);

        let guild = entry.application.guild_id;
        let config = self.configs.get(guild).await;

        // role sync is best effort, the decision stands regardless
        let mut roles = Vec::new();
        if status == ApplicationStatus::Accepted {
            roles.extend(self.members.grant_roles(guild, reference.applicant_id, &config.accept_roles).await);
            roles.extend(self.members.revoke_roles(guild, reference.applicant_id, &config.remove_roles).await);
            for failure in roles.iter().filter(|outcome| !outcome.is_ok()) {
                Logger::warn_long(
                    &format!("Failed to {} role {} for {}", failure.change, failure.role, reference.applicant_id),
                    failure.error.as_deref().unwrap_or_default());
            }
        }

        entry.application.status = status;
        entry.application.decided_by = Some(reviewer);
        entry.decided_at = Some(chrono::Utc::now().timestamp());
        entry.lock.clear();

        let mut notice_posted = false;
        if let Some(channel) = config.decision_channel {
            let notice = render::decision_notice(&entry.application, reviewer);
            match self.notifier.post(channel, &notice, &[]).await {
                Ok(_) => notice_posted = true,
                Err(err) => Logger::warn_long(
                    &format!("Failed to post decision notice for {}", reference),
                    &err.to_string()),
            }
        }

        self.rerender(entry).await;

        #[cfg(feature = "debug")]
        Logger::info_long("End", logstr);

        Ok(DecisionReport {
            reference,
            guild_id: guild,
            panel: entry.application.panel.clone(),
            status,
            roles,
            notice_posted,
        })
    }

    /// Posts a question for the applicant. Needs the claim, changes nothing.
    pub async fn request_info(&self,
                              reference: ApplicationRef,
                              reviewer: ReviewerId,
                              comment: &str) -> Result<NotificationRef, ReviewError>
    {
        let slot = self.slot(reference.applicant_id).await
            .ok_or(ReviewError::UnknownApplication)?;
        let mut slot = slot.lock().await;
        let entry = Self::entry_mut(&mut slot, &reference)?;
        Self::guard_holder(entry, reviewer)?;

        let config = self.configs.get(entry.application.guild_id).await;
        let channel = config.decision_channel
            .or(entry.application.notification.map(|notification| notification.channel))
            .or(config.review_channel)
            .ok_or(ReviewError::NotConfigured)?;

        let notice = render::info_notice(&entry.application, reviewer, comment);
        let notification = self.notifier.post(channel, &notice, &[]).await
            .map_err(|err| ReviewError::NotificationFailed(err.to_string()))?;
        entry.lock.touch(chrono::Utc::now().timestamp());
        Ok(notification)
    }

    /// The applicant's application that still awaits a decision.
    pub async fn pending_for(&self, applicant: ApplicantId) -> Option<ApplicationRef> {
        let slot = self.slot(applicant).await?;
        let slot = slot.lock().await;
        slot.as_ref()
            .filter(|entry| entry.application.status == ApplicationStatus::Pending)
            .map(|entry| entry.application.reference())
    }

    /// The card as `reviewer` sees it, sent privately after a claim.
    pub async fn reviewer_card(&self, reference: ApplicationRef, reviewer: ReviewerId) -> Option<(Content, Vec<Affordance>)> {
        let (application, lock) = self.snapshot(reference).await?;
        Some(render::review_card(&application, &lock, Viewer::Reviewer(reviewer)))
    }

    pub async fn snapshot(&self, reference: ApplicationRef) -> Option<(Application, ReviewLock)> {
        let slot = self.slot(reference.applicant_id).await?;
        let mut slot = slot.lock().await;
        Self::entry_mut(&mut slot, &reference).ok()
            .map(|entry| (entry.application.clone(), entry.lock))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::config::IntakeConfig;
    use crate::applications::custom_id::ReviewAction;
    use crate::applications::panel::find_panel;
    use crate::applications::services::RoleChange;
    use crate::utility::BoxedFuture;
    use serenity::model::id::{ChannelId, MessageId, RoleId, UserId};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    const GUILD: GuildId = GuildId::new(1);
    const REVIEW: ChannelId = ChannelId::new(100);
    const DECISIONS: ChannelId = ChannelId::new(200);
    const APPLICANT: UserId = UserId::new(42);
    const R1: UserId = UserId::new(7);
    const R2: UserId = UserId::new(8);

    #[derive(Default)]
    struct FakeNotifier {
        next_id: AtomicU64,
        posts: std::sync::Mutex<Vec<(ChannelId, Content)>>,
        updates: std::sync::Mutex<Vec<(NotificationRef, Content, Vec<Affordance>)>>,
        fail_updates: AtomicBool,
        fail_posts: AtomicBool,
    }

    impl FakeNotifier {
        fn posts_to(&self, channel: ChannelId) -> Vec<Content> {
            self.posts.lock().unwrap().iter()
                .filter(|(destination, _)| *destination == channel)
                .map(|(_, content)| content.clone())
                .collect()
        }

        fn last_affordances(&self) -> Vec<Affordance> {
            self.updates.lock().unwrap().last().map(|(_, _, affordances)| affordances.clone()).unwrap_or_default()
        }
    }

    impl Notifier for FakeNotifier {
        fn post<'a>(&'a self, destination: ChannelId, content: &'a Content, _affordances: &'a [Affordance])
            -> BoxedFuture<'a, anyhow::Result<NotificationRef>>
        {
            Box::pin(async move {
                if self.fail_posts.load(Ordering::SeqCst) {
                    anyhow::bail!("Missing Access");
                }
                self.posts.lock().unwrap().push((destination, content.clone()));
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(NotificationRef { channel: destination, message: MessageId::new(id) })
            })
        }

        fn update<'a>(&'a self, notification: NotificationRef, content: &'a Content, affordances: &'a [Affordance])
            -> BoxedFuture<'a, anyhow::Result<()>>
        {
            Box::pin(async move {
                if self.fail_updates.load(Ordering::SeqCst) {
                    anyhow::bail!("Unknown Message");
                }
                self.updates.lock().unwrap().push((notification, content.clone(), affordances.to_vec()));
                Ok(())
            })
        }
    }

    #[derive(Default)]
    struct FakeMembers {
        failing: HashSet<RoleId>,
        calls: std::sync::Mutex<Vec<(RoleChange, RoleId)>>,
    }

    impl MembershipMutator for FakeMembers {
        fn grant_role<'a>(&'a self, _guild: GuildId, _user: UserId, role: RoleId) -> BoxedFuture<'a, anyhow::Result<()>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push((RoleChange::Grant, role));
                if self.failing.contains(&role) {
                    anyhow::bail!("Missing Permissions");
                }
                Ok(())
            })
        }

        fn revoke_role<'a>(&'a self, _guild: GuildId, _user: UserId, role: RoleId) -> BoxedFuture<'a, anyhow::Result<()>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push((RoleChange::Revoke, role));
                if self.failing.contains(&role) {
                    anyhow::bail!("Missing Permissions");
                }
                Ok(())
            })
        }
    }

    struct FakeCollector(Option<Vec<Answer>>);

    impl InputCollector for FakeCollector {
        fn collect<'a>(&'a self, _title: &'a str, _questions: &'a [crate::applications::panel::Question])
            -> BoxedFuture<'a, Option<Vec<Answer>>>
        {
            Box::pin(async move { self.0.clone() })
        }
    }

    struct Setup {
        workflow: Arc<ApplicationReviewWorkflow>,
        notifier: Arc<FakeNotifier>,
        members: Arc<FakeMembers>,
    }

    async fn setup_with(members: FakeMembers, config: IntakeConfig) -> Setup {
        let notifier = Arc::new(FakeNotifier::default());
        let members = Arc::new(members);
        let workflow = Arc::new(ApplicationReviewWorkflow::new(notifier.clone(), members.clone()));
        workflow.configs().set(GUILD, config).await;
        Setup { workflow, notifier, members }
    }

    fn configured() -> IntakeConfig {
        IntakeConfig {
            review_channel: Some(REVIEW),
            decision_channel: Some(DECISIONS),
            accept_roles: vec![RoleId::new(1), RoleId::new(2)],
            remove_roles: vec![RoleId::new(3)],
            claim_timeout_secs: None,
        }
    }

    fn answers() -> Vec<Answer> {
        vec![Answer::new("Roblox username", "builderman"), Answer::new("Age", "21")]
    }

    async fn submitted(setup: &Setup) -> ApplicationRef {
        setup.workflow.submit(GUILD, "staff", APPLICANT, answers()).await.unwrap()
    }

    async fn state(setup: &Setup, reference: ApplicationRef) -> (ApplicationStatus, Option<ReviewerId>) {
        let (application, lock) = setup.workflow.snapshot(reference).await.unwrap();
        (application.status, lock.holder_id)
    }

    fn enabled(affordances: &[Affordance]) -> Vec<ReviewAction> {
        affordances.iter().filter(|affordance| !affordance.disabled).filter_map(Affordance::action).collect()
    }

    #[tokio::test]
    async fn submit_without_review_channel_posts_nothing() {
        let setup = setup_with(FakeMembers::default(), IntakeConfig::default()).await;
        let result = setup.workflow.submit(GUILD, "staff", APPLICANT, answers()).await;
        assert_eq!(result, Err(ReviewError::NotConfigured));
        assert!(setup.notifier.posts.lock().unwrap().is_empty());
        assert_eq!(setup.workflow.pending_for(APPLICANT).await, None);
    }

    #[tokio::test]
    async fn submit_posts_claimable_card_with_answers_in_order() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;

        let posts = setup.notifier.posts_to(REVIEW);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].fields[0], ("Roblox username".to_string(), "builderman".to_string(), false));
        assert_eq!(posts[0].fields[1].0, "Age");
        assert_eq!(state(&setup, reference).await, (ApplicationStatus::Pending, None));
        assert_eq!(setup.workflow.pending_for(APPLICANT).await, Some(reference));
    }

    #[tokio::test]
    async fn claim_conflict_then_accept_by_holder() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;

        assert_eq!(setup.workflow.claim(reference, R1).await, Ok(ClaimOutcome::Claimed));
        assert_eq!(enabled(&setup.notifier.last_affordances()),
            vec![ReviewAction::Accept, ReviewAction::Reject, ReviewAction::Info]);
        assert_eq!(setup.workflow.claim(reference, R2).await, Err(ReviewError::AlreadyLocked { holder: R1 }));

        let report = setup.workflow.accept(reference, R1).await.unwrap();
        assert_eq!(report.status, ApplicationStatus::Accepted);
        assert!(report.notice_posted);
        assert!(report.failed_roles().is_empty());
        assert_eq!(state(&setup, reference).await, (ApplicationStatus::Accepted, None));
        assert!(enabled(&setup.notifier.last_affordances()).is_empty());

        let notices = setup.notifier.posts_to(DECISIONS);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].field_value("Applicant"), Some("<@42>"));
        assert_eq!(notices[0].field_value("Reviewer"), Some("<@7>"));
    }

    #[tokio::test]
    async fn non_holder_is_turned_away_without_side_effects() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;
        setup.workflow.claim(reference, R1).await.unwrap();

        assert_eq!(setup.workflow.accept(reference, R2).await, Err(ReviewError::NotHolder));
        assert_eq!(setup.workflow.reject(reference, R2).await, Err(ReviewError::NotHolder));
        assert_eq!(setup.workflow.request_info(reference, R2, "?").await, Err(ReviewError::NotHolder));

        assert_eq!(state(&setup, reference).await, (ApplicationStatus::Pending, Some(R1)));
        assert!(setup.notifier.posts_to(DECISIONS).is_empty());
        assert!(setup.members.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unclaimed_application_cannot_be_decided() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;
        assert_eq!(setup.workflow.reject(reference, R1).await, Err(ReviewError::NotHolder));
        assert_eq!(setup.workflow.check_holder(reference, R1).await, Err(ReviewError::NotHolder));
    }

    #[tokio::test]
    async fn reclaim_by_holder_is_idempotent() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;
        setup.workflow.claim(reference, R1).await.unwrap();
        let (_, before) = setup.workflow.snapshot(reference).await.unwrap();

        assert_eq!(setup.workflow.claim(reference, R1).await, Ok(ClaimOutcome::AlreadyHeld));
        let (_, after) = setup.workflow.snapshot(reference).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn role_failures_do_not_block_acceptance() {
        let members = FakeMembers { failing: HashSet::from([RoleId::new(2)]), ..Default::default() };
        let setup = setup_with(members, configured()).await;
        let reference = submitted(&setup).await;
        setup.workflow.claim(reference, R1).await.unwrap();

        let report = setup.workflow.accept(reference, R1).await.unwrap();
        assert_eq!(state(&setup, reference).await, (ApplicationStatus::Accepted, None));
        assert_eq!(report.roles.len(), 3);
        let failed = report.failed_roles();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].role, RoleId::new(2));
        assert_eq!(failed[0].change, RoleChange::Grant);

        // the failing grant did not stop the grant and revoke after it
        assert_eq!(*setup.members.calls.lock().unwrap(), vec![
            (RoleChange::Grant, RoleId::new(1)),
            (RoleChange::Grant, RoleId::new(2)),
            (RoleChange::Revoke, RoleId::new(3)),
        ]);
    }

    #[tokio::test]
    async fn reject_touches_no_roles() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;
        setup.workflow.claim(reference, R1).await.unwrap();

        let report = setup.workflow.reject(reference, R1).await.unwrap();
        assert_eq!(report.status, ApplicationStatus::Rejected);
        assert!(report.roles.is_empty());
        assert!(setup.members.calls.lock().unwrap().is_empty());
        assert_eq!(setup.notifier.posts_to(DECISIONS)[0].title, "Application rejected");
    }

    #[tokio::test]
    async fn repeated_info_requests_keep_claim() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;
        setup.workflow.claim(reference, R1).await.unwrap();

        let first = setup.workflow.request_info(reference, R1, "Which timezone?").await.unwrap();
        let second = setup.workflow.request_info(reference, R1, "Any references?").await.unwrap();
        assert_ne!(first, second);

        let notices = setup.notifier.posts_to(DECISIONS);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].field_value("Comment"), Some("Which timezone?"));
        assert_eq!(notices[1].field_value("Comment"), Some("Any references?"));
        assert_eq!(state(&setup, reference).await, (ApplicationStatus::Pending, Some(R1)));
    }

    #[tokio::test]
    async fn decided_application_refuses_everything() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;
        setup.workflow.claim(reference, R1).await.unwrap();
        setup.workflow.reject(reference, R1).await.unwrap();
        let posts = setup.notifier.posts.lock().unwrap().len();

        let terminal: Result<(), ReviewError> = Err(ReviewError::NotPending(ApplicationStatus::Rejected));
        assert_eq!(setup.workflow.claim(reference, R2).await.map(|_| ()), terminal);
        assert_eq!(setup.workflow.accept(reference, R1).await.map(|_| ()), terminal);
        assert_eq!(setup.workflow.reject(reference, R1).await.map(|_| ()), terminal);
        assert_eq!(setup.workflow.request_info(reference, R1, "late").await.map(|_| ()), terminal);
        assert_eq!(setup.workflow.release(reference, R1, true).await.map(|_| ()), terminal);

        assert_eq!(state(&setup, reference).await, (ApplicationStatus::Rejected, None));
        assert_eq!(setup.notifier.posts.lock().unwrap().len(), posts);
    }

    #[tokio::test]
    async fn decided_slots_are_pruned_after_retention() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let decided = submitted(&setup).await;
        setup.workflow.claim(decided, R1).await.unwrap();
        setup.workflow.accept(decided, R1).await.unwrap();
        let pending = setup.workflow.submit(GUILD, "staff", UserId::new(43), answers()).await.unwrap();

        let now = chrono::Utc::now().timestamp();
        assert_eq!(setup.workflow.prune_decided(now - 60).await, 0);
        assert!(setup.workflow.snapshot(decided).await.is_some());

        assert_eq!(setup.workflow.prune_decided(now + 1).await, 1);
        assert!(setup.workflow.snapshot(decided).await.is_none());
        assert_eq!(setup.workflow.claim(decided, R1).await, Err(ReviewError::UnknownApplication));
        assert_eq!(setup.workflow.pending_for(UserId::new(43)).await, Some(pending));

        // the applicant may apply again afterwards
        assert!(setup.workflow.submit(GUILD, "staff", APPLICANT, answers()).await.is_ok());
    }

    #[tokio::test]
    async fn failed_submit_leaves_a_prunable_slot() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        setup.notifier.fail_posts.store(true, Ordering::SeqCst);
        assert!(setup.workflow.submit(GUILD, "staff", APPLICANT, answers()).await.is_err());
        assert_eq!(setup.workflow.prune_decided(0).await, 1);
    }

    #[tokio::test]
    async fn reviewer_card_is_rendered_for_the_viewer() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;
        setup.workflow.claim(reference, R1).await.unwrap();

        let (_, holder) = setup.workflow.reviewer_card(reference, R1).await.unwrap();
        assert_eq!(holder[0].label, "Claimed by you");
        assert_eq!(enabled(&holder), vec![ReviewAction::Accept, ReviewAction::Reject, ReviewAction::Info]);

        let (_, other) = setup.workflow.reviewer_card(reference, R2).await.unwrap();
        assert_eq!(other[0].label, "Someone else is reviewing");
        assert!(enabled(&other).is_empty());
    }

    #[tokio::test]
    async fn missing_decision_channel_skips_notice() {
        let config = IntakeConfig { decision_channel: None, ..configured() };
        let setup = setup_with(FakeMembers::default(), config).await;
        let reference = submitted(&setup).await;
        setup.workflow.claim(reference, R1).await.unwrap();

        let report = setup.workflow.accept(reference, R1).await.unwrap();
        assert!(!report.notice_posted);
        assert_eq!(setup.notifier.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lost_review_card_does_not_block_transitions() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;
        setup.notifier.fail_updates.store(true, Ordering::SeqCst);

        setup.workflow.claim(reference, R1).await.unwrap();
        setup.workflow.accept(reference, R1).await.unwrap();
        assert_eq!(state(&setup, reference).await, (ApplicationStatus::Accepted, None));
    }

    #[tokio::test]
    async fn second_pending_submission_is_refused_until_decided() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let first = submitted(&setup).await;
        assert_eq!(setup.workflow.submit(GUILD, "staff", APPLICANT, answers()).await, Err(ReviewError::AlreadyPending));
        assert_eq!(setup.workflow.check_can_submit(GUILD, APPLICANT).await, Err(ReviewError::AlreadyPending));

        setup.workflow.claim(first, R1).await.unwrap();
        setup.workflow.reject(first, R1).await.unwrap();
        let second = submitted(&setup).await;
        assert_ne!(first, second);

        // buttons of the old card point at an application that is gone
        assert_eq!(setup.workflow.claim(first, R1).await, Err(ReviewError::UnknownApplication));
        assert_eq!(setup.workflow.claim(second, R1).await, Ok(ClaimOutcome::Claimed));
    }

    #[tokio::test]
    async fn unknown_applicant_is_reported() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = ApplicationRef { applicant_id: UserId::new(999), application_id: Uuid::new_v4() };
        assert_eq!(setup.workflow.claim(reference, R1).await, Err(ReviewError::UnknownApplication));
        assert_eq!(setup.workflow.accept(reference, R1).await.map(|_| ()), Err(ReviewError::UnknownApplication));
    }

    #[tokio::test]
    async fn release_rules() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let reference = submitted(&setup).await;
        assert_eq!(setup.workflow.release(reference, R1, false).await, Ok(None));

        setup.workflow.claim(reference, R1).await.unwrap();
        assert_eq!(setup.workflow.release(reference, R2, false).await, Err(ReviewError::NotHolder));
        assert_eq!(setup.workflow.release(reference, R1, false).await, Ok(Some(R1)));
        assert_eq!(enabled(&setup.notifier.last_affordances()), vec![ReviewAction::Claim]);

        setup.workflow.claim(reference, R2).await.unwrap();
        assert_eq!(setup.workflow.release(reference, R1, true).await, Ok(Some(R2)));
        assert_eq!(state(&setup, reference).await, (ApplicationStatus::Pending, None));
    }

    #[tokio::test]
    async fn idle_claim_can_be_taken_over_once_timeout_passed() {
        let setup = setup_with(FakeMembers::default(), IntakeConfig { claim_timeout_secs: Some(0), ..configured() }).await;
        let reference = submitted(&setup).await;
        setup.workflow.claim(reference, R1).await.unwrap();
        assert_eq!(setup.workflow.claim(reference, R2).await, Ok(ClaimOutcome::Reclaimed { previous: R1 }));
        assert_eq!(state(&setup, reference).await, (ApplicationStatus::Pending, Some(R2)));

        setup.workflow.configs().update(GUILD, |config| config.claim_timeout_secs = Some(3600)).await;
        assert_eq!(setup.workflow.claim(reference, R1).await, Err(ReviewError::AlreadyLocked { holder: R2 }));
    }

    #[tokio::test]
    async fn active_holder_keeps_claim_past_timeout() {
        let setup = setup_with(FakeMembers::default(), IntakeConfig { claim_timeout_secs: Some(2), ..configured() }).await;
        let reference = submitted(&setup).await;
        setup.workflow.claim(reference, R1).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
        setup.workflow.request_info(reference, R1, "Which timezone?").await.unwrap();
        assert_eq!(setup.workflow.claim(reference, R2).await, Err(ReviewError::AlreadyLocked { holder: R1 }));

        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
        assert_eq!(setup.workflow.claim(reference, R1).await, Ok(ClaimOutcome::AlreadyHeld));
        assert_eq!(setup.workflow.claim(reference, R2).await, Err(ReviewError::AlreadyLocked { holder: R1 }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_have_exactly_one_winner() {
        for _ in 0..32 {
            let setup = setup_with(FakeMembers::default(), configured()).await;
            let reference = submitted(&setup).await;

            let first = tokio::spawn({
                let workflow = Arc::clone(&setup.workflow);
                async move { workflow.claim(reference, R1).await }
            });
            let second = tokio::spawn({
                let workflow = Arc::clone(&setup.workflow);
                async move { workflow.claim(reference, R2).await }
            });
            let results = vec![first.await.unwrap(), second.await.unwrap()];

            let winners = results.iter().filter(|result| **result == Ok(ClaimOutcome::Claimed)).count();
            let losers = results.iter()
                .filter(|result| matches!(result, Err(ReviewError::AlreadyLocked { .. })))
                .count();
            assert_eq!((winners, losers), (1, 1));

            let winner = if results[0].is_ok() { R1 } else { R2 };
            let (_, lock) = setup.workflow.snapshot(reference).await.unwrap();
            assert_eq!(lock.holder_id, Some(winner));
        }
    }

    #[tokio::test]
    async fn collected_form_is_submitted_and_cancel_creates_nothing() {
        let setup = setup_with(FakeMembers::default(), configured()).await;
        let panel = find_panel("staff").unwrap();

        let cancelled = setup.workflow.submit_with(&FakeCollector(None), GUILD, panel, APPLICANT).await;
        assert_eq!(cancelled, Ok(None));
        assert!(setup.notifier.posts.lock().unwrap().is_empty());

        let reference = setup.workflow
            .submit_with(&FakeCollector(Some(answers())), GUILD, panel, APPLICANT).await
            .unwrap().unwrap();
        let (application, _) = setup.workflow.snapshot(reference).await.unwrap();
        assert_eq!(application.panel, "staff");
        assert_eq!(application.answers, answers());
    }
}
