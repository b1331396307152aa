//! Quote command handler

use crate::config::Config;
use crate::parser::ticker::is_valid_symbol;
use crate::state::Providers;

pub async fn cmd_quote(config: &Config, symbol: &str) -> anyhow::Result<()> {
    let symbol = symbol.trim().to_uppercase();
    if !is_valid_symbol(&symbol) {
        anyhow::bail!("Invalid ticker symbol: {symbol}");
    }

    let providers = Providers::from_config(config)?;

    let Some(quote) = providers.market.global_quote(&symbol).await? else {
        println!("No quote available for {symbol}");
        return Ok(());
    };

    println!("{} as of {}", quote.symbol, quote.latest_trading_day);
    println!("{:-<40}", "");
    println!("  Price:          {}", quote.price);
    println!("  Change:         {} ({})", quote.change, quote.change_percent);
    println!("  Open:           {}", quote.open);
    println!("  High / Low:     {} / {}", quote.high, quote.low);
    println!("  Previous close: {}", quote.previous_close);
    println!("  Volume:         {}", quote.volume);

    Ok(())
}
