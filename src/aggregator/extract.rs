use serde_json::Value;

/// The one validity rule for every provider: a price may arrive as a JSON
/// number or a numeric string, and must be finite and strictly positive.
/// Zero and negative values are not real quotes.
pub fn price_value(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if price.is_finite() && price > 0.0 {
        Some(price)
    } else {
        None
    }
}

pub fn coingecko(body: &Value, symbol: &str) -> Option<f64> {
    price_value(body.get(symbol)?.get("usd")?)
}

pub fn coinmarketcap(body: &Value, symbol: &str) -> Option<f64> {
    let listing = body
        .get("data")?
        .as_array()?
        .iter()
        .find(|item| item.get("symbol").and_then(Value::as_str) == Some(symbol))?;
    price_value(listing.get("quote")?.get("USD")?.get("price")?)
}

pub fn binance(body: &Value, _symbol: &str) -> Option<f64> {
    price_value(body.get("price")?)
}

pub fn kraken(body: &Value, symbol: &str) -> Option<f64> {
    let pair = format!("{}USD", symbol);
    price_value(body.get("result")?.get(pair.as_str())?.get("c")?.get(0)?)
}

pub fn bitfinex(body: &Value, symbol: &str) -> Option<f64> {
    let ticker = format!("t{}USD", symbol);
    let row = body
        .as_array()?
        .iter()
        .find(|item| item.get(0).and_then(Value::as_str) == Some(ticker.as_str()))?;
    // Row layout: [SYMBOL, BID, BID_SIZE, ASK, ASK_SIZE, DAILY_CHANGE,
    // DAILY_CHANGE_RELATIVE, LAST_PRICE, VOLUME, HIGH, LOW]
    price_value(row.get(7)?)
}

pub fn coinbase(body: &Value, _symbol: &str) -> Option<f64> {
    price_value(body.get("data")?.get("amount")?)
}

pub fn blockchain_com(body: &Value, _symbol: &str) -> Option<f64> {
    price_value(body.get("last_trade_price")?)
}

pub fn coinpaprika(body: &Value, _symbol: &str) -> Option<f64> {
    price_value(body.get("quotes")?.get("USD")?.get("price")?)
}

pub fn coincap(body: &Value, _symbol: &str) -> Option<f64> {
    price_value(body.get("data")?.get("priceUsd")?)
}

pub fn coinlore(body: &Value, symbol: &str) -> Option<f64> {
    let row = body
        .as_array()?
        .iter()
        .find(|item| item.get("id").and_then(Value::as_str) == Some(symbol))?;
    price_value(row.get("price_usd")?)
}

pub fn gemini(body: &Value, _symbol: &str) -> Option<f64> {
    price_value(body.get("last")?)
}

pub fn huobi(body: &Value, _symbol: &str) -> Option<f64> {
    price_value(body.get("tick")?.get("close")?)
}

pub fn okx(body: &Value, symbol: &str) -> Option<f64> {
    let row = body
        .get("data")?
        .as_array()?
        .iter()
        .find(|item| item.get("instId").and_then(Value::as_str) == Some(symbol))?;
    price_value(row.get("last")?)
}

pub fn bittrex(body: &Value, _symbol: &str) -> Option<f64> {
    price_value(body.get("lastTradeRate")?)
}

pub fn phemex(body: &Value, symbol: &str) -> Option<f64> {
    let row = body
        .get("data")?
        .as_array()?
        .iter()
        .find(|item| item.get("symbol").and_then(Value::as_str) == Some(symbol))?;
    price_value(row.get("last")?)
}

pub fn cryptocompare(body: &Value, _symbol: &str) -> Option<f64> {
    price_value(body.get("USD")?)
}

pub fn nomics(body: &Value, symbol: &str) -> Option<f64> {
    let row = body
        .as_array()?
        .iter()
        .find(|item| item.get("id").and_then(Value::as_str) == Some(symbol))?;
    price_value(row.get("price")?)
}

pub fn messari(body: &Value, _symbol: &str) -> Option<f64> {
    price_value(body.get("data")?.get("market_data")?.get("price_usd")?)
}

pub fn coinranking(body: &Value, symbol: &str) -> Option<f64> {
    let coin = body
        .get("data")?
        .get("coins")?
        .as_array()?
        .iter()
        .find(|item| item.get("symbol").and_then(Value::as_str) == Some(symbol))?;
    price_value(coin.get("price")?)
}

pub fn investing(body: &Value, symbol: &str) -> Option<f64> {
    let row = body
        .as_array()?
        .iter()
        .find(|item| item.get("symbol").and_then(Value::as_str) == Some(symbol))?;
    price_value(row.get("last_price")?)
}
