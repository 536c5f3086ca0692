//! Database schema and migrations for filehost.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded. Every foreign key cascades on delete.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    username      TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password      TEXT NOT NULL,                 -- Argon2 hash
    access_level  INTEGER NOT NULL DEFAULT 0,    -- -1 banned, 0 default, 1 moderator, 2 admin
    otp           TEXT,                          -- OTP secret
    last_otp      INTEGER,                       -- last accepted OTP code
    year_joined   INTEGER NOT NULL DEFAULT (CAST(strftime('%Y', 'now') AS INTEGER)),
    created_at    TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_access_level ON users(access_level);
"#,
    // v2: files and the small/large blob split
    r#"
CREATE TABLE small_files (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    data  BLOB NOT NULL
);

CREATE TABLE large_files (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    data  BLOB NOT NULL
);

CREATE TABLE files (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    description  TEXT,
    author_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    public       INTEGER NOT NULL DEFAULT 0,
    file_type    INTEGER NOT NULL,                -- 0 small_files, 1 large_files
    file_id      INTEGER NOT NULL,
    mime_type    TEXT NOT NULL DEFAULT 'application/octet-stream',
    size         INTEGER NOT NULL,
    checksum     TEXT NOT NULL,                   -- SHA-256 hex
    width        INTEGER,
    height       INTEGER,
    thumbnail    TEXT,
    qualities    TEXT,                            -- JSON array of {label, src}
    created_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_author_id ON files(author_id);
CREATE INDEX idx_files_public ON files(public);

-- Blob rows follow their file, including deletes cascaded from users.
CREATE TRIGGER files_delete_blob AFTER DELETE ON files
BEGIN
    DELETE FROM small_files WHERE OLD.file_type = 0 AND id = OLD.file_id;
    DELETE FROM large_files WHERE OLD.file_type = 1 AND id = OLD.file_id;
END;
"#,
    // v3: comments
    r#"
CREATE TABLE comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    file_id     INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_comments_file_id ON comments(file_id);
CREATE INDEX idx_comments_author_id ON comments(author_id);
"#,
    // v4: access records
    r#"
CREATE TABLE access_records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    file_id     INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(user_id, file_id)
);

CREATE INDEX idx_access_records_file_id ON access_records(file_id);
"#,
];
