use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::employees::storage::LeadTally;
use crate::employees::{Employee, EmployeeStatus};
use crate::leads::types::LeadStatus;

pub const CHART_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCard {
    pub name: String,
    pub email: String,
    pub employee_id: String,
    pub initials: String,
    pub assigned: i64,
    pub closed: i64,
    pub status: EmployeeStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub unassigned_leads: i64,
    pub assigned_this_week: i64,
    pub active_salespeople: usize,
    pub conversion_rate: String,
    pub employees: Vec<EmployeeCard>,
}

/// Status and creation time of one lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadPoint {
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

pub fn conversion_rate(closed: i64, assigned: i64) -> String {
    if assigned <= 0 {
        return "0%".to_string();
    }
    let rate = (closed as f64 / assigned as f64 * 100.0).round() as i64;
    format!("{rate}%")
}

fn first_letter(s: &str) -> String {
    s.trim().chars().next().map(|c| c.to_string()).unwrap_or_default()
}

pub fn initials(first_name: &str, last_name: &str, employee_code: &str) -> String {
    let from_name = format!("{}{}", first_letter(first_name), first_letter(last_name));
    if !from_name.is_empty() {
        return from_name.to_uppercase();
    }
    employee_code.chars().take(2).collect::<String>().to_uppercase()
}

pub fn employee_card(employee: &Employee, tally: LeadTally) -> EmployeeCard {
    let name = employee.full_name();
    EmployeeCard {
        name: if name.is_empty() {
            "Unknown".to_string()
        } else {
            name
        },
        email: employee.email.clone(),
        employee_id: employee.employee_id.clone(),
        initials: initials(
            &employee.first_name,
            &employee.last_name,
            &employee.employee_id,
        ),
        assigned: tally.assigned,
        closed: tally.closed,
        status: employee.status,
    }
}

pub fn build_stats(
    employees: &[Employee],
    tallies: &HashMap<Uuid, LeadTally>,
    leads: &[LeadPoint],
) -> DashboardStats {
    let count = |wanted: fn(LeadStatus) -> bool| {
        leads.iter().filter(|point| wanted(point.status)).count() as i64
    };
    let unassigned = count(|s| s == LeadStatus::Unassigned);
    let held = count(|s| s != LeadStatus::Unassigned);
    let closed = count(|s| s == LeadStatus::Closed);

    let cards: Vec<EmployeeCard> = employees
        .iter()
        .map(|e| employee_card(e, tallies.get(&e.id).copied().unwrap_or_default()))
        .collect();

    DashboardStats {
        unassigned_leads: unassigned,
        assigned_this_week: cards.iter().map(|c| c.assigned).sum(),
        active_salespeople: cards
            .iter()
            .filter(|c| c.status == EmployeeStatus::Active)
            .count(),
        conversion_rate: conversion_rate(closed, held),
        employees: cards,
    }
}

/// Seven daily percentages ending `today`, oldest first: the share of leads
/// created that day that are closed now.
pub fn conversion_chart(leads: &[LeadPoint], today: NaiveDate) -> Vec<i64> {
    (0..CHART_DAYS)
        .rev()
        .map(|offset| {
            let day = today.checked_sub_days(Days::new(offset));
            let (total, closed) = leads
                .iter()
                .filter(|point| Some(point.created_at.date_naive()) == day)
                .fold((0i64, 0i64), |(total, closed), point| {
                    let is_closed = point.status == LeadStatus::Closed;
                    (total + 1, closed + i64::from(is_closed))
                });
            if total == 0 {
                0
            } else {
                (closed as f64 / total as f64 * 100.0).round() as i64
            }
        })
        .collect()
}
