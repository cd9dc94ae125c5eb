mod submission_key;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "lunchbook",
    "m0001",
    vec_box![],
    vec_box![submission_key::CreateTable, submission_key::CreateIdx1]
);
