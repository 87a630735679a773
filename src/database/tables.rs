pub const CREATE_BALANCES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS balances (
        account TEXT PRIMARY KEY,
        amount INTEGER NOT NULL CHECK (amount > 0)
    )";

pub const CREATE_SUPPLY_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS supply (
        id INTEGER PRIMARY KEY CHECK (id = 0),
        amount INTEGER NOT NULL CHECK (amount >= 0)
    )";

pub const CREATE_CONTRACTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS contracts (
        account TEXT PRIMARY KEY,
        payable INTEGER NOT NULL
    )";

pub const CREATE_TRANSFERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS transfers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sender TEXT,
        recipient TEXT NOT NULL,
        amount INTEGER NOT NULL CHECK (amount > 0)
    )";

pub async fn initialize_database(conn: &libsql::Connection) -> Result<(), libsql::Error> {
    conn.execute(CREATE_BALANCES_TABLE, ()).await?;
    conn.execute(CREATE_SUPPLY_TABLE, ()).await?;
    conn.execute(CREATE_CONTRACTS_TABLE, ()).await?;
    conn.execute(CREATE_TRANSFERS_TABLE, ()).await?;
    conn.query("PRAGMA journal_mode = WAL;", ()).await?;
    conn.query("PRAGMA synchronous = NORMAL;", ()).await?;
    conn.query("PRAGMA busy_timeout = 5000;", ()).await?;
    Ok(())
}
