use anyhow::{Result, anyhow};
use jiff::Timestamp;

use crate::db::Database;
use crate::id::generate_id;
use crate::models::{Appointment, AppointmentStatus, ChatKind, ChatMessage, Role, User};
use crate::session::Session;

pub fn book(
    expert_id: &str,
    start: &str,
    session: &Session,
    db: &mut Database,
) -> Result<Appointment> {
    let expert = db
        .get_user(expert_id)
        .ok_or_else(|| anyhow!("Expert not found: {expert_id}"))?;
    if expert.role != Role::Expert {
        return Err(anyhow!("{} is not an expert account.", expert.full_name));
    }
    if expert.id == session.user_id {
        return Err(anyhow!("You cannot book an appointment with yourself."));
    }

    let start_time: Timestamp = start
        .parse()
        .map_err(|_| anyhow!("Invalid start time: {start}\nExpected RFC 3339, e.g. 2026-09-01T10:00:00Z"))?;

    let mut appointment = Appointment::new(
        generate_id(),
        expert.id.clone(),
        session.user_id.clone(),
        start_time,
    );
    appointment.chats.push(system_message(format!(
        "Appointment scheduled for {start_time}"
    )));

    db.create_appointment(appointment.clone())?;
    Ok(appointment)
}

fn system_message(content: String) -> ChatMessage {
    ChatMessage {
        id: generate_id(),
        user_id: "system".to_string(),
        user_name: "system".to_string(),
        content,
        timestamp: Timestamp::now(),
        kind: ChatKind::System,
    }
}

pub fn list(session: &Session, db: &Database) -> Vec<Appointment> {
    db.list_appointments(&session.user_id)
        .into_iter()
        .cloned()
        .collect()
}

pub fn finish(appointment_id: &str, session: &Session, db: &mut Database) -> Result<Appointment> {
    let mut appointment = fetch_for_participant(appointment_id, session, db)?;

    if appointment.status == AppointmentStatus::Finished {
        return Err(anyhow!("Appointment is already finished: {appointment_id}"));
    }

    appointment.finish(Timestamp::now());
    appointment
        .chats
        .push(system_message("Appointment finished".to_string()));
    db.update_appointment(appointment.clone())?;
    Ok(appointment)
}

pub fn chat(
    appointment_id: &str,
    message: String,
    kind: &str,
    session: &Session,
    db: &mut Database,
) -> Result<Appointment> {
    let kind: ChatKind = kind
        .parse()
        .map_err(|_| anyhow!("Unknown chat kind: {kind}. Expected text or image."))?;
    if kind == ChatKind::System {
        return Err(anyhow!("System messages are generated, not sent."));
    }

    let mut appointment = fetch_for_participant(appointment_id, session, db)?;

    let sender: &User = db
        .get_user(&session.user_id)
        .ok_or_else(|| anyhow!("Signed-in user no longer exists: {}", session.user_id))?;

    appointment.chats.push(ChatMessage {
        id: generate_id(),
        user_id: sender.id.clone(),
        user_name: sender.full_name.clone(),
        content: message,
        timestamp: Timestamp::now(),
        kind,
    });

    db.update_appointment(appointment.clone())?;
    Ok(appointment)
}

fn fetch_for_participant(
    appointment_id: &str,
    session: &Session,
    db: &Database,
) -> Result<Appointment> {
    let appointment = db
        .get_appointment(appointment_id)
        .ok_or_else(|| anyhow!("Appointment not found: {appointment_id}"))?;
    if !appointment.is_participant(&session.user_id) {
        return Err(anyhow!("Only the appointment participants can do that."));
    }
    Ok(appointment.clone())
}
