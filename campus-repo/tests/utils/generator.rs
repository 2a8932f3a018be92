#![allow(dead_code)]

use campus_repo::course_repo::{NewAssignment, NewCourse};
use campus_repo::transaction_repo::NewTransaction;
use campus_repo::user_repo::NewUser;
use chrono::Utc;
use fake::faker::internet::en::Username;
use fake::faker::lorem::en::{Sentence, Words};
use fake::faker::name::en::Name;
use fake::Fake;

pub fn generate_new_course() -> NewCourse {
    let number: i64 = (1000..5000).fake();
    let words: Vec<String> = Words(2..4).fake();
    NewCourse::new(format!("CS {}", number), words.join(" "))
}

pub fn generate_new_assignment() -> NewAssignment {
    let due_date: i64 = (1_600_000_000..1_700_000_000).fake();
    NewAssignment::new(Sentence(2..5).fake(), due_date)
}

pub fn generate_new_course_user() -> campus_repo::course_repo::NewUser {
    let name: String = Name().fake();
    let number: u32 = (100..999).fake();
    let initials: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect::<String>()
        .to_lowercase();
    campus_repo::course_repo::NewUser::new(name, format!("{}{}", initials, number))
}

pub fn generate_new_user_with_balance(balance: i64) -> NewUser {
    NewUser::new(Name().fake(), Username().fake(), balance)
}

pub fn generate_new_transaction(
    sender_id: i64,
    receiver_id: i64,
    amount: i64,
    accepted: Option<bool>,
) -> NewTransaction {
    let message: Option<String> = if (0..2).fake::<u8>() == 0 {
        None
    } else {
        Some(Sentence(3..6).fake())
    };
    NewTransaction::new(
        Utc::now(),
        sender_id,
        receiver_id,
        amount,
        message,
        accepted,
    )
}
