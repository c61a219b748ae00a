//! Ticket Store
//!
//! CRUD, filtered listing, and aggregate statistics over the tickets table.
//! Enum columns are stored as their wire strings; rows read back with
//! out-of-enum values collapse to defaults rather than failing the query.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;

use super::database::SharedDatabase;
use crate::types::{
    Category, NewTicket, Priority, Result, ResultExt, Status, Ticket, TicketError, TicketPatch,
};

/// Listing filters. All present filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    /// Case-insensitive substring match against title or description.
    pub search: Option<String>,
}

/// Aggregate statistics over all tickets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketStats {
    pub total_tickets: u64,
    pub open_tickets: u64,
    /// Total divided by days since the oldest ticket, clamped to at least
    /// one day, rounded to one decimal. Zero when there are no tickets.
    pub avg_tickets_per_day: f64,
    pub priority_breakdown: BTreeMap<&'static str, u64>,
    pub category_breakdown: BTreeMap<&'static str, u64>,
}

const TICKET_COLUMNS: &str =
    "id, title, description, category, priority, status, created_at, updated_at";

/// Thread-safe store over the pooled database.
#[derive(Clone)]
pub struct TicketStore {
    db: SharedDatabase,
}

impl TicketStore {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    /// Insert a ticket, applying enum defaults for absent fields.
    pub fn create(&self, new: &NewTicket) -> Result<Ticket> {
        let now = Utc::now();
        let category = new.category.unwrap_or_default();
        let priority = new.priority.unwrap_or_default();
        let status = new.status.unwrap_or_default();

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO tickets (title, description, category, priority, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.title,
                new.description,
                category.as_str(),
                priority.as_str(),
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .with_context("Failed to insert ticket")?;

        let id = conn.last_insert_rowid();
        drop(conn);
        self.get(id)
    }

    /// Fetch a ticket by id.
    pub fn get(&self, id: i64) -> Result<Ticket> {
        let conn = self.db.connection()?;
        let result = conn.query_row(
            &format!("SELECT {} FROM tickets WHERE id = ?1", TICKET_COLUMNS),
            params![id],
            Self::row_to_ticket,
        );

        match result {
            Ok(ticket) => Ok(ticket),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(TicketError::NotFound(id)),
            Err(e) => Err(TicketError::Storage(format!(
                "Failed to load ticket {}: {}",
                id, e
            ))),
        }
    }

    /// List tickets newest-first, applying the given filters.
    pub fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(category) = filter.category {
            values.push(Box::new(category.as_str()));
            conditions.push(format!("category = ?{}", values.len()));
        }
        if let Some(priority) = filter.priority {
            values.push(Box::new(priority.as_str()));
            conditions.push(format!("priority = ?{}", values.len()));
        }
        if let Some(status) = filter.status {
            values.push(Box::new(status.as_str()));
            conditions.push(format!("status = ?{}", values.len()));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            values.push(Box::new(format!("%{}%", escape_like(search))));
            let index = values.len();
            conditions.push(format!(
                "(title LIKE ?{index} ESCAPE '\\' OR description LIKE ?{index} ESCAPE '\\')"
            ));
        }

        let mut query = format!("SELECT {} FROM tickets", TICKET_COLUMNS);
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY created_at DESC, id DESC");

        let conn = self.db.connection()?;
        let mut stmt = conn
            .prepare(&query)
            .with_context("Failed to prepare ticket listing query")?;

        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let tickets = stmt
            .query_map(params_refs.as_slice(), Self::row_to_ticket)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context("Failed to fetch tickets")?;

        Ok(tickets)
    }

    /// Apply a partial update. Absent fields keep their stored value;
    /// `updated_at` refreshes on every successful call.
    pub fn update(&self, id: i64, patch: &TicketPatch) -> Result<Ticket> {
        let now = Utc::now();
        let mut set_clauses: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(title) = &patch.title {
            values.push(Box::new(title.clone()));
            set_clauses.push(format!("title = ?{}", values.len()));
        }
        if let Some(description) = &patch.description {
            values.push(Box::new(description.clone()));
            set_clauses.push(format!("description = ?{}", values.len()));
        }
        if let Some(category) = patch.category {
            values.push(Box::new(category.as_str()));
            set_clauses.push(format!("category = ?{}", values.len()));
        }
        if let Some(priority) = patch.priority {
            values.push(Box::new(priority.as_str()));
            set_clauses.push(format!("priority = ?{}", values.len()));
        }
        if let Some(status) = patch.status {
            values.push(Box::new(status.as_str()));
            set_clauses.push(format!("status = ?{}", values.len()));
        }

        values.push(Box::new(now.to_rfc3339()));
        set_clauses.push(format!("updated_at = ?{}", values.len()));

        values.push(Box::new(id));
        let query = format!(
            "UPDATE tickets SET {} WHERE id = ?{}",
            set_clauses.join(", "),
            values.len()
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let affected = self.db.execute(&query, params_refs.as_slice())?;
        if affected == 0 {
            return Err(TicketError::NotFound(id));
        }

        self.get(id)
    }

    /// Delete a ticket by id.
    pub fn delete(&self, id: i64) -> Result<()> {
        let affected = self
            .db
            .execute("DELETE FROM tickets WHERE id = ?1", &[&id])?;
        if affected == 0 {
            return Err(TicketError::NotFound(id));
        }
        Ok(())
    }

    /// Compute aggregate statistics in the database.
    pub fn stats(&self) -> Result<TicketStats> {
        let conn = self.db.connection()?;

        let total_tickets: u64 = conn
            .query_row("SELECT COUNT(*) FROM tickets", [], |row| {
                row.get::<_, i64>(0)
            })
            .with_context("Failed to count tickets")? as u64;

        let open_tickets: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM tickets WHERE status = 'open'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .with_context("Failed to count open tickets")? as u64;

        let avg_tickets_per_day = if total_tickets > 0 {
            let oldest: Option<String> = conn
                .query_row(
                    "SELECT created_at FROM tickets ORDER BY created_at ASC LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .ok();
            match oldest.as_deref().and_then(parse_timestamp) {
                Some(created) => {
                    let days = (Utc::now() - created).num_days().max(1);
                    round_one_decimal(total_tickets as f64 / days as f64)
                }
                None => 0.0,
            }
        } else {
            0.0
        };

        let priority_breakdown = Self::breakdown(
            &conn,
            "SELECT priority, COUNT(*) FROM tickets GROUP BY priority",
            &Priority::ALL.map(|p| p.as_str()),
        )?;
        let category_breakdown = Self::breakdown(
            &conn,
            "SELECT category, COUNT(*) FROM tickets GROUP BY category",
            &Category::ALL.map(|c| c.as_str()),
        )?;

        Ok(TicketStats {
            total_tickets,
            open_tickets,
            avg_tickets_per_day,
            priority_breakdown,
            category_breakdown,
        })
    }

    /// Group counts by an enum column, reporting every value even at zero.
    fn breakdown(
        conn: &rusqlite::Connection,
        query: &str,
        all_values: &[&'static str],
    ) -> Result<BTreeMap<&'static str, u64>> {
        let mut counts: BTreeMap<&'static str, u64> =
            all_values.iter().map(|v| (*v, 0u64)).collect();

        let mut stmt = conn
            .prepare(query)
            .with_context("Failed to prepare breakdown query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context("Failed to fetch breakdown")?;

        for (value, count) in rows {
            if let Some(entry) = all_values.iter().find(|v| **v == value) {
                counts.insert(*entry, count as u64);
            }
        }

        Ok(counts)
    }

    fn row_to_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
        let category_str: String = row.get(3)?;
        let priority_str: String = row.get(4)?;
        let status_str: String = row.get(5)?;
        let created_at_str: String = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        Ok(Ticket {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            category: Category::parse_or_default(&category_str),
            priority: Priority::parse_or_default(&priority_str),
            status: Status::parse_or_default(&status_str),
            created_at: parse_timestamp(&created_at_str).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&updated_at_str).unwrap_or_else(Utc::now),
        })
    }
}

/// Escape LIKE wildcards so a search term only matches as a literal
/// substring. Pairs with `ESCAPE '\'` in the query.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use std::sync::Arc;

    fn store() -> TicketStore {
        let db = Database::open_in_memory().expect("Failed to open database");
        db.initialize().expect("Failed to initialize schema");
        TicketStore::new(Arc::new(db))
    }

    fn new_ticket(title: &str) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            description: format!("Description for {}", title),
            category: None,
            priority: None,
            status: None,
        }
    }

    #[test]
    fn test_create_applies_defaults() {
        let store = store();
        let ticket = store.create(&new_ticket("Login broken")).unwrap();

        assert!(ticket.id > 0);
        assert_eq!(ticket.category, Category::General);
        assert_eq!(ticket.priority, Priority::Medium);
        assert_eq!(ticket.status, Status::Open);
        assert_eq!(ticket.created_at, ticket.updated_at);
    }

    #[test]
    fn test_create_with_explicit_fields() {
        let store = store();
        let ticket = store
            .create(&NewTicket {
                title: "Invoice doubled".to_string(),
                description: "Charged twice this month".to_string(),
                category: Some(Category::Billing),
                priority: Some(Priority::High),
                status: Some(Status::InProgress),
            })
            .unwrap();

        assert_eq!(ticket.category, Category::Billing);
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.status, Status::InProgress);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = store();
        match store.get(999) {
            Err(TicketError::NotFound(id)) => assert_eq!(id, 999),
            other => panic!("Expected NotFound, got {:?}", other.map(|t| t.id)),
        }
    }

    #[test]
    fn test_list_orders_newest_first() {
        let store = store();
        let first = store.create(&new_ticket("first")).unwrap();
        let second = store.create(&new_ticket("second")).unwrap();
        let third = store.create(&new_ticket("third")).unwrap();

        let all = store.list(&TicketFilter::default()).unwrap();
        let ids: Vec<i64> = all.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn test_list_filters_combine_with_and() {
        let store = store();
        store
            .create(&NewTicket {
                category: Some(Category::Billing),
                priority: Some(Priority::High),
                ..new_ticket("billing high")
            })
            .unwrap();
        store
            .create(&NewTicket {
                category: Some(Category::Billing),
                priority: Some(Priority::Low),
                ..new_ticket("billing low")
            })
            .unwrap();
        store
            .create(&NewTicket {
                category: Some(Category::Technical),
                priority: Some(Priority::High),
                ..new_ticket("technical high")
            })
            .unwrap();

        let filter = TicketFilter {
            category: Some(Category::Billing),
            priority: Some(Priority::High),
            ..Default::default()
        };
        let results = store.list(&filter).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "billing high");
    }

    #[test]
    fn test_list_search_matches_title_or_description() {
        let store = store();
        store
            .create(&NewTicket {
                title: "Password reset".to_string(),
                description: "Reset link never arrives".to_string(),
                category: None,
                priority: None,
                status: None,
            })
            .unwrap();
        store
            .create(&NewTicket {
                title: "Slow dashboard".to_string(),
                description: "Dashboard takes a minute; password field lags too".to_string(),
                category: None,
                priority: None,
                status: None,
            })
            .unwrap();
        store.create(&new_ticket("Unrelated")).unwrap();

        let filter = TicketFilter {
            search: Some("password".to_string()),
            ..Default::default()
        };
        let results = store.list(&filter).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_search_wildcards_are_literal() {
        let store = store();
        store
            .create(&NewTicket {
                title: "CPU pegged".to_string(),
                description: "CPU stuck at 99 for hours".to_string(),
                category: None,
                priority: None,
                status: None,
            })
            .unwrap();
        store
            .create(&NewTicket {
                title: "Import rejected".to_string(),
                description: "snake_case field names fail validation".to_string(),
                category: None,
                priority: None,
                status: None,
            })
            .unwrap();
        store
            .create(&NewTicket {
                title: "Battery drain".to_string(),
                description: "Drops from 100% to empty in minutes".to_string(),
                category: None,
                priority: None,
                status: None,
            })
            .unwrap();

        let search = |term: &str| {
            store
                .list(&TicketFilter {
                    search: Some(term.to_string()),
                    ..Default::default()
                })
                .unwrap()
        };

        // "_" must not act as a single-character wildcard
        assert!(search("_PU stuck").is_empty());
        // "%" must not act as a match-anything wildcard
        assert_eq!(search("%").len(), 1);
        assert!(search("99% of the time").is_empty());

        // Literal underscores and percent signs still match
        assert_eq!(search("snake_case").len(), 1);
        assert_eq!(search("100%").len(), 1);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_update_is_partial_and_bumps_updated_at() {
        let store = store();
        let ticket = store.create(&new_ticket("Original")).unwrap();

        let patch = TicketPatch {
            status: Some(Status::Resolved),
            ..Default::default()
        };
        let updated = store.update(ticket.id, &patch).unwrap();

        assert_eq!(updated.title, "Original");
        assert_eq!(updated.status, Status::Resolved);
        assert_eq!(updated.created_at, ticket.created_at);
        assert!(updated.updated_at >= ticket.updated_at);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = store();
        let patch = TicketPatch {
            title: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update(42, &patch),
            Err(TicketError::NotFound(42))
        ));
    }

    #[test]
    fn test_delete() {
        let store = store();
        let ticket = store.create(&new_ticket("To delete")).unwrap();

        store.delete(ticket.id).unwrap();
        assert!(matches!(
            store.get(ticket.id),
            Err(TicketError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(ticket.id),
            Err(TicketError::NotFound(_))
        ));
    }

    #[test]
    fn test_stats_empty_store() {
        let store = store();
        let stats = store.stats().unwrap();

        assert_eq!(stats.total_tickets, 0);
        assert_eq!(stats.open_tickets, 0);
        assert_eq!(stats.avg_tickets_per_day, 0.0);
        assert_eq!(stats.priority_breakdown.len(), 4);
        assert_eq!(stats.category_breakdown.len(), 4);
        assert!(stats.priority_breakdown.values().all(|&c| c == 0));
    }

    #[test]
    fn test_stats_counts_and_breakdowns() {
        let store = store();
        store
            .create(&NewTicket {
                category: Some(Category::Billing),
                priority: Some(Priority::High),
                ..new_ticket("a")
            })
            .unwrap();
        store
            .create(&NewTicket {
                category: Some(Category::Billing),
                status: Some(Status::Closed),
                ..new_ticket("b")
            })
            .unwrap();
        store.create(&new_ticket("c")).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_tickets, 3);
        assert_eq!(stats.open_tickets, 2);
        // All created just now, so the day window clamps to one
        assert_eq!(stats.avg_tickets_per_day, 3.0);
        assert_eq!(stats.category_breakdown["billing"], 2);
        assert_eq!(stats.category_breakdown["general"], 1);
        assert_eq!(stats.category_breakdown["technical"], 0);
        assert_eq!(stats.priority_breakdown["high"], 1);
        assert_eq!(stats.priority_breakdown["medium"], 2);
    }

    #[test]
    fn test_stats_avg_rounds_to_one_decimal() {
        assert_eq!(round_one_decimal(10.0 / 3.0), 3.3);
        assert_eq!(round_one_decimal(2.0 / 7.0), 0.3);
        assert_eq!(round_one_decimal(5.0), 5.0);
    }
}
