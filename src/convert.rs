pub fn crypto_to_usd(amount: f64, price: f64) -> f64 {
    amount * price
}

/// Zero when the price is zero rather than infinity.
pub fn usd_to_crypto(amount: f64, price: f64) -> f64 {
    if price == 0.0 {
        return 0.0;
    }
    amount / price
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    CryptoToUsd,
    UsdToCrypto,
}

/// Two linked amount fields: editing one recomputes the other.
#[derive(Debug, Clone, PartialEq)]
pub struct Converter {
    symbol: String,
    price: f64,
    crypto: f64,
    usd: f64,
    direction: Direction,
}

impl Converter {
    /// Starts at one unit of the coin.
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            price,
            crypto: 1.0,
            usd: price,
            direction: Direction::CryptoToUsd,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn crypto(&self) -> f64 {
        self.crypto
    }

    pub fn usd(&self) -> f64 {
        self.usd
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Unparseable input counts as zero.
    pub fn set_crypto(&mut self, input: &str) {
        self.crypto = parse_amount(input);
        self.direction = Direction::CryptoToUsd;
        self.usd = crypto_to_usd(self.crypto, self.price);
    }

    pub fn set_usd(&mut self, input: &str) {
        self.usd = parse_amount(input);
        self.direction = Direction::UsdToCrypto;
        self.crypto = usd_to_crypto(self.usd, self.price);
    }

    /// New price; the side the user last edited stays fixed.
    pub fn reprice(&mut self, price: f64) {
        self.price = price;
        match self.direction {
            Direction::CryptoToUsd => self.usd = crypto_to_usd(self.crypto, price),
            Direction::UsdToCrypto => self.crypto = usd_to_crypto(self.usd, price),
        }
    }
}

fn parse_amount(input: &str) -> f64 {
    input
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
