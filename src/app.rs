//! Application controller: owns every piece of screen state, launches the
//! network work for user actions and folds the results back in.
//!
//! All mutation happens on the UI task through [`AppController::apply`].
//! Network calls run as spawned tasks that report an [`AppEvent`] over an
//! unbounded channel; once the receiving side is gone their results are
//! dropped.

use crate::{
    api::{
        Ack,
        ActivityAccount,
        ApiError,
        ApiResult,
        Award,
        DrawAward,
        RaffleApi,
        RecentWinner,
        RuleWeight,
        SkuProduct,
    },
    award_grid::{
        AwardGrid,
        GridCell,
    },
    config::{
        Session,
        SessionError,
    },
    gate::{
        Action,
        ActionGate,
    },
    marquee::MarqueeTicker,
    refresh::{
        RefreshCoordinator,
        RefreshReason,
    },
    sequencer::{
        DrawOutcome,
        DrawResolution,
        DrawSequencer,
        DrawTicket,
    },
};
use std::{
    future::Future,
    time::Duration,
};
use tokio::{
    sync::{
        mpsc,
        watch,
    },
    task::JoinHandle,
    time,
};
use tracing::{
    debug,
    error,
    info,
    warn,
};

const MAX_ERRORS: usize = 50;
/// The marquee scrolls one column every this many animation ticks.
const MARQUEE_TICK_DIVISOR: u64 = 3;

#[derive(Debug)]
pub struct MemberUpdate {
    pub account: ApiResult<ActivityAccount>,
    pub credit: ApiResult<f64>,
    pub signed: ApiResult<bool>,
}

#[derive(Debug)]
pub enum AppEvent {
    Awards(ApiResult<Vec<Award>>),
    Member(MemberUpdate),
    RuleWeights(ApiResult<Vec<RuleWeight>>),
    Skus(ApiResult<Vec<SkuProduct>>),
    Winners(ApiResult<Vec<RecentWinner>>),
    Drawn(DrawResolution),
    Landed {
        ticket: DrawTicket,
        at: Option<usize>,
    },
    DrewTen(ApiResult<Vec<DrawAward>>),
    Signed(ApiResult<Ack>),
    Armory(ApiResult<Ack>),
    Redeemed {
        sku: i64,
        result: ApiResult<Ack>,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberCard {
    pub credit: Option<f64>,
    pub account: Option<ActivityAccount>,
    pub signed: bool,
}

#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub session: Session,
    pub cells: Vec<GridCell>,
    pub highlight: usize,
    pub drawing: bool,
    pub member: MemberCard,
    pub rule_weights: Vec<RuleWeight>,
    pub skus: Vec<SkuProduct>,
    pub redeeming: Option<i64>,
    pub signing: bool,
    pub ten_drawing: bool,
    pub ticker: MarqueeTicker,
    pub ten_draw: Option<Vec<DrawAward>>,
    pub status: String,
    pub errors: Vec<String>,
}

pub struct AppController<A> {
    api: A,
    session: Session,
    events: mpsc::UnboundedSender<AppEvent>,
    refresh: RefreshCoordinator,
    gate: ActionGate,
    sequencer: DrawSequencer,
    grid: AwardGrid,
    member: MemberCard,
    rule_weights: Vec<RuleWeight>,
    skus: Vec<SkuProduct>,
    redeeming: Option<i64>,
    ticker: MarqueeTicker,
    ten_draw: Option<Vec<DrawAward>>,
    frame: u64,
    winners_poll_interval: Duration,
    workers: Vec<JoinHandle<()>>,
    pub status: String,
    pub errors: Vec<String>,
}

impl<A> Drop for AppController<A> {
    fn drop(&mut self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}

impl<A> AppController<A>
where
    A: RaffleApi + Clone + Send + Sync + 'static,
{
    pub fn new(
        api: A,
        session: Session,
        winners_poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let controller = AppController {
            api,
            session,
            events,
            refresh: RefreshCoordinator::new(),
            gate: ActionGate::default(),
            sequencer: DrawSequencer::default(),
            grid: AwardGrid::default(),
            member: MemberCard::default(),
            rule_weights: Vec::new(),
            skus: Vec::new(),
            redeeming: None,
            ticker: MarqueeTicker::default(),
            ten_draw: None,
            frame: 0,
            winners_poll_interval,
            workers: Vec::new(),
            status: String::new(),
            errors: Vec::new(),
        };
        (controller, events_rx)
    }

    /// Spawns the background refresh and winners workers and requests the
    /// SKU catalog.
    pub fn start(&mut self) {
        if let Err(err) = self.session.require_complete() {
            self.push_errors(vec![err.to_string()]);
            return;
        }
        info!(
            user_id = %self.session.user_id,
            activity_id = self.session.activity_id,
            "starting raffle session"
        );
        self.workers.push(tokio::spawn(refresh_worker(
            self.api.clone(),
            self.session.clone(),
            self.refresh.subscribe(),
            self.events.clone(),
        )));
        self.workers.push(tokio::spawn(winners_worker(
            self.api.clone(),
            self.session.activity_id,
            self.winners_poll_interval,
            self.events.clone(),
        )));
        self.refresh.bump(RefreshReason::Startup);
        self.reload_skus();
        self.set_status("Loading awards...");
    }

    pub fn refresh(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    fn spawn_task<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = task.await;
            if events.send(event).is_err() {
                debug!(task = label, "ui loop gone; discarding result");
            }
        });
    }

    /// Reports an incomplete session instead of letting the action reach the
    /// API with a blank user or activity.
    fn session_allows(&mut self, checked: Result<(), SessionError>) -> bool {
        match checked {
            Ok(()) => true,
            Err(err) => {
                self.push_errors(vec![err.to_string()]);
                false
            }
        }
    }

    pub fn spin(&mut self) {
        if !self.session_allows(self.session.require_complete()) {
            return;
        }
        let Some(ticket) = self.sequencer.activate() else {
            return;
        };
        self.set_status("Drawing...");
        let api = self.api.clone();
        let session = self.session.clone();
        self.spawn_task("draw", async move {
            AppEvent::Drawn(ticket.request(&api, &session).await)
        });
    }

    pub fn draw_ten(&mut self) {
        if !self.session_allows(self.session.require_complete()) {
            return;
        }
        if !self.gate.try_begin(Action::TenDraw) {
            return;
        }
        self.set_status("Drawing ten times...");
        let api = self.api.clone();
        let session = self.session.clone();
        self.spawn_task("draw_ten", async move {
            AppEvent::DrewTen(api.draw_ten(&session).await)
        });
    }

    pub fn sign_in(&mut self) {
        if !self.session_allows(self.session.require_user().map(|_| ())) {
            return;
        }
        if self.member.signed {
            self.set_status("Already signed in today");
            return;
        }
        if !self.gate.try_begin(Action::SignIn) {
            return;
        }
        self.set_status("Signing in...");
        let api = self.api.clone();
        let user_id = self.session.user_id.clone();
        self.spawn_task("sign_in", async move {
            AppEvent::Signed(api.sign_in(&user_id).await)
        });
    }

    pub fn armory(&mut self) {
        let activity_id = match self.session.require_activity() {
            Ok(id) => id,
            Err(err) => {
                self.push_errors(vec![err.to_string()]);
                return;
            }
        };
        if !self.gate.try_begin(Action::Armory) {
            return;
        }
        self.set_status("Warming up strategy...");
        let api = self.api.clone();
        self.spawn_task("armory", async move {
            AppEvent::Armory(api.armory(activity_id).await)
        });
    }

    /// Redeems one SKU. Only one redemption runs at a time across all SKUs.
    pub fn redeem(&mut self, sku: i64) {
        if !self.session_allows(self.session.require_user().map(|_| ())) {
            return;
        }
        if !self.gate.try_begin(Action::Redeem) {
            return;
        }
        self.redeeming = Some(sku);
        self.set_status(format!("Redeeming SKU {sku}..."));
        let api = self.api.clone();
        let user_id = self.session.user_id.clone();
        self.spawn_task("redeem_sku", async move {
            let result = api.redeem_sku(&user_id, sku).await;
            AppEvent::Redeemed { sku, result }
        });
    }

    pub fn reload_skus(&mut self) {
        if !self.session_allows(self.session.require_activity().map(|_| ())) {
            return;
        }
        let api = self.api.clone();
        let activity_id = self.session.activity_id;
        self.spawn_task("sku_products", async move {
            AppEvent::Skus(api.sku_products(activity_id).await)
        });
    }

    pub fn refresh_now(&mut self) {
        self.set_status("Refreshing...");
        self.refresh.bump(RefreshReason::Manual);
    }

    pub fn dismiss_ten_draw(&mut self) {
        self.ten_draw = None;
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Awards(result) => {
                if self.grid.apply(result) && self.status == "Loading awards..." {
                    self.set_status("Ready");
                }
            }
            AppEvent::Member(update) => self.apply_member(update),
            AppEvent::RuleWeights(result) => match result {
                Ok(tiers) => self.rule_weights = tiers,
                Err(err) => warn!(error = %err, "rule weight fetch failed"),
            },
            AppEvent::Skus(result) => match result {
                Ok(skus) => {
                    debug!(count = skus.len(), "sku catalog loaded");
                    self.skus = skus;
                }
                Err(err) => {
                    self.push_errors(vec![format!(
                        "Loading SKUs failed: {}",
                        err.user_message()
                    )]);
                }
            },
            AppEvent::Winners(result) => match result {
                Ok(winners) => self.ticker.set_entries(&winners),
                Err(err) => warn!(error = %err, "recent winners poll failed"),
            },
            AppEvent::Drawn(resolution) => {
                let ticket = resolution.ticket;
                if let Some(landing) = self.sequencer.resolve(resolution) {
                    self.spawn_task("landing", async move {
                        AppEvent::Landed {
                            ticket,
                            at: landing.await,
                        }
                    });
                }
            }
            AppEvent::Landed { ticket, at } => {
                debug!(?at, "wheel landed");
                match self.sequencer.settle(ticket) {
                    Some(DrawOutcome::Won(award)) => {
                        self.set_status(format!("Congratulations: {}", award.award_title));
                    }
                    Some(DrawOutcome::Failed { message }) => {
                        self.push_errors(vec![message]);
                    }
                    None => return,
                }
                self.refresh.bump(RefreshReason::DrawSettled);
            }
            AppEvent::DrewTen(result) => {
                self.gate.finish(Action::TenDraw);
                match result {
                    Ok(awards) => {
                        info!(count = awards.len(), "ten-draw complete");
                        self.set_status(format!("Ten-draw complete: {} awards", awards.len()));
                        self.ten_draw = Some(awards);
                        self.refresh.bump(RefreshReason::TenDraw);
                    }
                    Err(err) => self.report_failure("Ten-draw failed", &err),
                }
            }
            AppEvent::Signed(result) => {
                self.gate.finish(Action::SignIn);
                match result {
                    Ok(ack) => {
                        info!(?ack, "signed in");
                        self.member.signed = true;
                        self.set_status("Sign-in succeeded");
                        self.refresh.bump(RefreshReason::SignIn);
                    }
                    Err(err) => self.report_failure("Sign-in failed", &err),
                }
            }
            AppEvent::Armory(result) => {
                self.gate.finish(Action::Armory);
                match result {
                    Ok(_) => self.set_status("Armory ready"),
                    Err(ApiError::Business { code, info }) => {
                        self.push_errors(vec![format!(
                            "Armory failed: code={code} info={info}"
                        )]);
                    }
                    Err(err) => self.report_failure("Armory failed", &err),
                }
            }
            AppEvent::Redeemed { sku, result } => {
                self.gate.finish(Action::Redeem);
                self.redeeming = None;
                match result {
                    Ok(_) => {
                        info!(sku, "sku redeemed");
                        self.set_status("Redemption succeeded");
                        self.refresh.bump(RefreshReason::Redemption);
                    }
                    Err(err) => self.report_failure("Redemption failed", &err),
                }
            }
        }
    }

    fn apply_member(&mut self, update: MemberUpdate) {
        let MemberUpdate {
            account,
            credit,
            signed,
        } = update;
        match account {
            Ok(account) => self.member.account = Some(account),
            Err(err) => warn!(error = %err, "activity account fetch failed"),
        }
        match credit {
            Ok(credit) => self.member.credit = Some(credit),
            Err(err) => warn!(error = %err, "credit balance fetch failed"),
        }
        match signed {
            Ok(signed) => self.member.signed = signed,
            Err(err) => warn!(error = %err, "sign-in status fetch failed"),
        }
    }

    fn report_failure(&mut self, prefix: &str, err: &ApiError) {
        self.push_errors(vec![format!("{prefix}: {}", err.user_message())]);
    }

    /// Advances the animations by one frame.
    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        self.sequencer.tick();
        if self.frame % MARQUEE_TICK_DIVISOR == 0 {
            self.ticker.advance();
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            session: self.session.clone(),
            cells: self.grid.cells().to_vec(),
            highlight: self.sequencer.wheel().position(),
            drawing: !self.sequencer.is_idle(),
            member: self.member.clone(),
            rule_weights: self.rule_weights.clone(),
            skus: self.skus.clone(),
            redeeming: self.redeeming,
            signing: self.gate.is_busy(Action::SignIn),
            ten_drawing: self.gate.is_busy(Action::TenDraw),
            ticker: self.ticker.clone(),
            ten_draw: self.ten_draw.clone(),
            status: self.status.clone(),
            errors: self.errors.clone(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.errors.clear();
    }

    pub fn push_errors(&mut self, mut items: Vec<String>) {
        if items.is_empty() {
            return;
        }
        for item in &items {
            error!("{}", item);
        }
        self.errors.append(&mut items);
        if self.errors.len() > MAX_ERRORS {
            let drain = self.errors.len() - MAX_ERRORS;
            self.errors.drain(0..drain);
        }
    }
}

/// Fetches everything that depends on balances once, then again on every
/// refresh generation.
async fn refresh_worker<A: RaffleApi>(
    api: A,
    session: Session,
    mut generations: watch::Receiver<u64>,
    events: mpsc::UnboundedSender<AppEvent>,
) {
    loop {
        if generations.changed().await.is_err() {
            return;
        }
        debug!(generation = *generations.borrow_and_update(), "refreshing");
        let (awards, account, credit, signed, weights) = tokio::join!(
            api.award_list(&session),
            api.activity_account(&session),
            api.credit_balance(&session.user_id),
            api.sign_in_status(&session.user_id),
            api.rule_weights(&session),
        );
        let batch = [
            AppEvent::Awards(awards),
            AppEvent::Member(MemberUpdate {
                account,
                credit,
                signed,
            }),
            AppEvent::RuleWeights(weights),
        ];
        for event in batch {
            if events.send(event).is_err() {
                debug!("ui loop gone; refresh worker exiting");
                return;
            }
        }
    }
}

async fn winners_worker<A: RaffleApi>(
    api: A,
    activity_id: i64,
    poll_interval: Duration,
    events: mpsc::UnboundedSender<AppEvent>,
) {
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let winners = api.recent_winners(activity_id).await;
        if events.send(AppEvent::Winners(winners)).is_err() {
            debug!("ui loop gone; winners worker exiting");
            return;
        }
    }
}
