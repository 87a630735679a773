pub const NAME: &str = "Peet";
pub const SYMBOL: &str = "PTE";
pub const DECIMALS: u8 = 8;
pub const SUPPORTED_STANDARDS: [&str; 3] = ["NEP-5", "NEP-7", "NEP-10"];

/// Stored units per whole token.
pub const FACTOR: u64 = 10u64.pow(DECIMALS as u32);

pub const START_SUPPLY: u64 = 10_000;
pub const MAX_SUPPLY: u64 = 100_000;
