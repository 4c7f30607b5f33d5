//! Signal Scout binary entrypoint.
//!
//! With no arguments the watch loop runs until Ctrl-C; other commands are
//! one-shot.

use tracing_subscriber::EnvFilter;

use scout_app::runtime::ScoutRuntime;
use scout_common::config::AppConfig;
use scout_common::types::Direction;
use scout_engine::alerts::breach_payload;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "signal_scout=info,scout_app=info,scout_common=info,scout_feed=info,scout_engine=info,scout_chain=info",
            )
        }))
        .init();

    let config = AppConfig::from_env()?;
    let mut runtime = ScoutRuntime::from_config(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("watch");

    match command {
        "watch" => {
            tracing::info!("Signal Scout starting...");
            tokio::select! {
                result = runtime.watch() => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received shutdown signal, stopping gracefully...");
                }
            }
        }

        "signals" => {
            let direction = match args.get(1).map(String::as_str) {
                Some("losers") => Direction::Losers,
                _ => Direction::Gainers,
            };
            let limit = args
                .get(2)
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(20usize);

            for signal in runtime.signals(direction, limit).await {
                println!(
                    "{:<10} {:>8.2}%  {}",
                    signal.symbol, signal.momentum_6h, signal.category
                );
            }
        }

        "detail" => {
            let symbol = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("usage: signal-scout detail <SYMBOL>"))?;
            match runtime.detail(symbol).await {
                Some((detail, drivers)) => {
                    println!("{}", detail.description);
                    for driver in drivers {
                        println!("  {:<16} {:>8.2}  ({})", driver.name, driver.value, driver.description);
                    }
                }
                None => println!("No signal data for {}", symbol.to_uppercase()),
            }
        }

        "subscribe" => {
            let token = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("usage: signal-scout subscribe <TOKEN> <THRESHOLD>"))?;
            let threshold: f64 = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("usage: signal-scout subscribe <TOKEN> <THRESHOLD>"))?
                .parse()
                .map_err(|_| anyhow::anyhow!("THRESHOLD must be a number"))?;

            let sub = runtime.subscribe(token, threshold).await?;
            println!("Subscribed to {} at {}% (id {})", sub.token, sub.threshold, sub.id);
        }

        "unsubscribe" => {
            let id = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("usage: signal-scout unsubscribe <ID>"))?;
            if runtime.unsubscribe(id)? {
                println!("Removed subscription {}", id);
            } else {
                println!("No subscription with id {}", id);
            }
        }

        "subscriptions" => {
            let fid = runtime
                .fid()
                .ok_or_else(|| anyhow::anyhow!("SCOUT_FID must be set for subscription commands"))?;
            for sub in runtime.subscriptions().user_subscriptions(fid) {
                println!("{:<28} {:<10} {:>6.1}%", sub.id, sub.token, sub.threshold);
            }
        }

        "alerts" => {
            let token = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("usage: signal-scout alerts <TOKEN>"))?;
            let fid = runtime
                .fid()
                .ok_or_else(|| anyhow::anyhow!("SCOUT_FID must be set for subscription commands"))?;
            let threshold = runtime
                .subscriptions()
                .user_subscriptions(fid)
                .into_iter()
                .find(|sub| sub.token == token.trim().to_uppercase())
                .map(|sub| sub.threshold);

            let ticks = runtime.alerts(token).await?;
            if ticks.is_empty() {
                println!("No threshold breaches in recent history");
            }
            for tick in &ticks {
                let payload = breach_payload(tick, threshold.unwrap_or_default());
                println!("[{}] {}", payload.severity, payload.body);
            }
        }

        "watchlist" => match (args.get(1).map(String::as_str), args.get(2)) {
            (Some("add"), Some(symbol)) => {
                if runtime.watchlist_add(symbol)? {
                    println!("Added {} to watchlist", symbol.to_uppercase());
                } else {
                    println!("{} already on watchlist", symbol.to_uppercase());
                }
            }
            (Some("remove"), Some(symbol)) => {
                if runtime.watchlist_remove(symbol)? {
                    println!("Removed {} from watchlist", symbol.to_uppercase());
                } else {
                    println!("{} not on watchlist", symbol.to_uppercase());
                }
            }
            (Some("show"), _) | (None, _) => {
                for signal in runtime.watchlist_signals().await {
                    println!("{:<10} {:>8.2}%", signal.symbol, signal.momentum_6h);
                }
            }
            _ => anyhow::bail!("usage: signal-scout watchlist [add|remove|show] [SYMBOL]"),
        },

        "status" => {
            if let Some(fid) = runtime.fid() {
                let count = runtime.subscriptions().subscription_count(fid);
                let eligible = runtime.subscriptions().is_scout_eligible(fid);
                println!("fid {}: {} subscription(s), scout eligible: {}", fid, count, eligible);
            }
            println!("watchlist: {}", runtime.watchlist_symbols().join(", "));
            match runtime.counter_status().await {
                Some(status) => {
                    println!(
                        "counter {} (next milestone {}, at milestone: {})",
                        status.counter, status.next_milestone, status.at_milestone
                    );
                    if let Some(has_nft) = status.has_nft {
                        println!("wallet holds NFT: {}", has_nft);
                    }
                }
                None => println!("contract status unavailable"),
            }
        }

        "mint-milestone" => {
            let tx_hash = runtime.mint_milestone().await?;
            println!("Milestone NFT minted in tx {:#x}", tx_hash);
        }

        "mint-scout" => {
            let tx_hash = runtime.mint_scout().await?;
            println!("Signal Scout NFT minted in tx {:#x}", tx_hash);
        }

        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    eprintln!(
        "usage: signal-scout [COMMAND]

commands:
  watch                         run the watch loop (default)
  signals [gainers|losers] [N]  top signals by momentum
  detail <SYMBOL>               token detail and signal drivers
  subscribe <TOKEN> <PCT>       add a token alert subscription
  unsubscribe <ID>              remove a subscription by id
  subscriptions                 list subscriptions
  alerts <TOKEN>                recent threshold breaches for a token
  watchlist [add|remove|show]   manage the watchlist
  status                        local and on-chain status
  mint-milestone                mint the milestone NFT
  mint-scout                    mint the Signal Scout NFT"
    );
}
