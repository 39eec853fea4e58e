use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    tracing::debug!("Database ready at {}", database_url);

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create challenges table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS challenges (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            goal TEXT NOT NULL,
            duration INTEGER NOT NULL,
            owner_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create progress table
    // challenge_id has no FOREIGN KEY: entries may outlive their challenge
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS progress (
            id TEXT PRIMARY KEY NOT NULL,
            challenge_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            day INTEGER NOT NULL,
            value REAL NOT NULL DEFAULT 1,
            logged_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Indexes backing the filtered subscriptions
    for sql in [
        "CREATE INDEX IF NOT EXISTS idx_challenges_owner ON challenges(owner_id)",
        "CREATE INDEX IF NOT EXISTS idx_progress_challenge ON progress(challenge_id)",
        "CREATE INDEX IF NOT EXISTS idx_progress_user ON progress(user_id)",
    ] {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            sql.to_owned(),
        ))
        .await?;
    }

    Ok(())
}
