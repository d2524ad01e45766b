use crate::ui;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use raffle_console::{
    api::HttpRaffleApi,
    app::{
        AppController,
        AppEvent,
    },
    config::AppConfig,
};
use std::time::Duration;
use tokio::{
    sync::mpsc,
    time::{
        self,
        MissedTickBehavior,
    },
};
use tracing::{
    info,
    warn,
};

type Controller = AppController<HttpRaffleApi>;

pub async fn run_app(config: AppConfig) -> Result<()> {
    let api = HttpRaffleApi::new(&config.api_url)?;
    info!(base_url = api.base_url(), "using raffle API");
    let (mut controller, events) = AppController::new(
        api,
        config.session.clone(),
        config.winners_poll_interval,
    );
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    ui::terminal_enter(&mut ui_state)?;
    info!("UI ready");
    controller.start();
    let res = run_loop(
        &mut controller,
        events,
        &mut ui_state,
        &mut input_events,
        config.tick_interval,
    )
    .await;
    ui::terminal_exit()?;
    res
}

fn handle_user_event(controller: &mut Controller, event: ui::UserEvent) {
    match event {
        ui::UserEvent::Quit | ui::UserEvent::Redraw | ui::UserEvent::OpenSkuStore => {}
        ui::UserEvent::Spin => controller.spin(),
        ui::UserEvent::TenDraw => controller.draw_ten(),
        ui::UserEvent::SignIn => controller.sign_in(),
        ui::UserEvent::Armory => controller.armory(),
        ui::UserEvent::Refresh => controller.refresh_now(),
        ui::UserEvent::Redeem(sku) => controller.redeem(sku),
        ui::UserEvent::ReloadSkus => controller.reload_skus(),
        ui::UserEvent::DismissTenDraw => controller.dismiss_ten_draw(),
    }
}

/// Drives the screen until the user quits. Dropping `events` on return makes
/// any request still in flight discard its result.
async fn run_loop(
    controller: &mut Controller,
    mut events: mpsc::UnboundedReceiver<AppEvent>,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
    tick_interval: Duration,
) -> Result<()> {
    let mut ticker = time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ui::draw(ui_state, &controller.snapshot()).wrap_err("initial draw failed")?;

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    warn!("app event channel closed");
                    break;
                };
                controller.apply(event);
            }
            _ = ticker.tick() => {
                controller.tick();
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                if ev == ui::UserEvent::Quit {
                    info!("quit requested");
                    break;
                }
                handle_user_event(controller, ev);
            }
        }
        ui::draw(ui_state, &controller.snapshot()).wrap_err("draw failed")?;
    }
    Ok(())
}
