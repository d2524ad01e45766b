use crate::Command;
use color_eyre::eyre::{
    Report,
    Result,
    eyre,
};
use itertools::Itertools;
use raffle_console::{
    api::{
        Ack,
        ApiError,
        HttpRaffleApi,
        RaffleApi,
    },
    award_grid::AwardGrid,
    config::AppConfig,
};

fn failed(action: &str, err: ApiError) -> Report {
    let message = format!("{action} failed: {}", err.user_message());
    Report::new(err).wrap_err(message)
}

pub async fn run(config: &AppConfig, command: Command) -> Result<()> {
    let api = HttpRaffleApi::new(&config.api_url)?;
    let session = &config.session;
    match command {
        Command::Tui => Err(eyre!("the TUI is not a one-shot command")),
        Command::Armory => {
            let activity_id = session.require_activity()?;
            match api.armory(activity_id).await {
                Ok(_) => {
                    println!("Armory ready");
                    Ok(())
                }
                Err(ApiError::Business { code, info }) => {
                    Err(eyre!("Armory failed: code={code} info={info}"))
                }
                Err(err) => Err(failed("Armory", err)),
            }
        }
        Command::Awards => {
            session.require_complete()?;
            let awards = api
                .award_list(session)
                .await
                .map_err(|err| failed("Loading awards", err))?;
            let mut grid = AwardGrid::default();
            grid.replace(awards)?;
            for cell in grid.cells() {
                println!("[{}] {} {}", cell.slot_key(), cell.award.id, cell.label());
            }
            Ok(())
        }
        Command::Draw => {
            session.require_complete()?;
            let award = api
                .draw(session)
                .await
                .map_err(|err| failed("Draw", err))?;
            println!(
                "Congratulations: {} (award {}, slot {})",
                award.award_title,
                award.award_id,
                award.grid_index()
            );
            Ok(())
        }
        Command::DrawTen => {
            session.require_complete()?;
            let awards = api
                .draw_ten(session)
                .await
                .map_err(|err| failed("Ten-draw", err))?;
            for (n, award) in awards.iter().enumerate() {
                println!("{:>2}. {} (award {})", n + 1, award.award_title, award.award_id);
            }
            Ok(())
        }
        Command::Account => {
            session.require_complete()?;
            let account = api
                .activity_account(session)
                .await
                .map_err(|err| failed("Loading account", err))?;
            println!(
                "total {}/{} | month {}/{} | today {}/{} (remaining/limit)",
                account.total_count_surplus,
                account.total_count,
                account.month_count_surplus,
                account.month_count,
                account.day_count_surplus,
                account.day_count
            );
            Ok(())
        }
        Command::Credit => {
            let user_id = session.require_user()?;
            let credit = api
                .credit_balance(user_id)
                .await
                .map_err(|err| failed("Loading credit", err))?;
            println!("{credit:.2}");
            Ok(())
        }
        Command::Sign => {
            let user_id = session.require_user()?;
            let ack = api
                .sign_in(user_id)
                .await
                .map_err(|err| failed("Sign-in", err))?;
            match ack {
                Ack::Done => println!("Sign-in succeeded"),
                Ack::AlreadyDone => println!("Already signed in today"),
            }
            Ok(())
        }
        Command::SignStatus => {
            let user_id = session.require_user()?;
            let signed = api
                .sign_in_status(user_id)
                .await
                .map_err(|err| failed("Sign-in status", err))?;
            println!("{}", if signed { "signed" } else { "not signed" });
            Ok(())
        }
        Command::RuleWeights => {
            session.require_complete()?;
            let tiers = api
                .rule_weights(session)
                .await
                .map_err(|err| failed("Loading rule weights", err))?;
            for tier in tiers {
                let awards = tier.awards.iter().map(|a| a.award_title.as_str()).join(", ");
                println!(
                    "{}/{} ({}%) {}",
                    tier.progress,
                    tier.threshold,
                    tier.percent(),
                    awards
                );
            }
            Ok(())
        }
        Command::Skus => {
            let activity_id = session.require_activity()?;
            let skus = api
                .sku_products(activity_id)
                .await
                .map_err(|err| failed("Loading SKUs", err))?;
            for sku in skus {
                println!(
                    "{} | {:.2} credits | +{} draws | stock {}/{}",
                    sku.sku,
                    sku.product_amount,
                    sku.draws_granted(),
                    sku.stock_count_surplus,
                    sku.stock_count
                );
            }
            Ok(())
        }
        Command::Redeem { sku } => {
            let user_id = session.require_user()?;
            api.redeem_sku(user_id, sku)
                .await
                .map_err(|err| failed("Redemption", err))?;
            println!("Redemption succeeded");
            Ok(())
        }
        Command::Winners => {
            let activity_id = session.require_activity()?;
            let winners = api
                .recent_winners(activity_id)
                .await
                .map_err(|err| failed("Loading winners", err))?;
            for winner in winners {
                println!(
                    "{} {} won {}",
                    winner.award_time, winner.user_id, winner.award_title
                );
            }
            Ok(())
        }
    }
}
