pub(super) const COURSE_TABLES: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        code TEXT NOT NULL,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assignments (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        title     TEXT    NOT NULL,
        due_date  INTEGER NOT NULL,
        course_id INTEGER NOT NULL REFERENCES courses (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS course_users (
        id    INTEGER PRIMARY KEY AUTOINCREMENT,
        name  TEXT NOT NULL,
        netid TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS memberships (
        course_id INTEGER NOT NULL REFERENCES courses (id) ON DELETE CASCADE,
        user_id   INTEGER NOT NULL REFERENCES course_users (id) ON DELETE CASCADE,
        role      TEXT    NOT NULL,
        PRIMARY KEY (course_id, user_id)
    )
    "#,
];

pub(super) const DROP_COURSE_TABLES: [&str; 4] = [
    "DROP TABLE IF EXISTS memberships",
    "DROP TABLE IF EXISTS assignments",
    "DROP TABLE IF EXISTS course_users",
    "DROP TABLE IF EXISTS courses",
];

pub(super) const PAYMENT_TABLES: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT    NOT NULL,
        username TEXT    NOT NULL,
        balance  INTEGER NOT NULL DEFAULT 0
    )
    "#,
    // sender and receiver are not foreign keys: deleting a user keeps their history
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp   TEXT    NOT NULL,
        sender_id   INTEGER NOT NULL,
        receiver_id INTEGER NOT NULL,
        amount      INTEGER NOT NULL,
        message     TEXT,
        accepted    BOOLEAN
    )
    "#,
];

pub(super) const DROP_PAYMENT_TABLES: [&str; 2] = [
    "DROP TABLE IF EXISTS transactions",
    "DROP TABLE IF EXISTS users",
];
