use async_trait::async_trait;
use chrono::Duration;
use icalendar::{Alarm, Calendar, Component, EventLike, Trigger};
use tracing::info;

use crate::calendar::{CalendarGenerator, GenerationError, GenerationRequest};
use crate::gitlab::{GitlabClient, Issue, Milestone};

/// Production generator: authenticates against the configured GitLab
/// instance, pulls issues and milestones for the configured projects and
/// groups, and encodes them into a single combined calendar.
pub struct GitlabCalendarGenerator;

#[async_trait]
impl CalendarGenerator for GitlabCalendarGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        let client = GitlabClient::new(&request.endpoint, &request.token)?;
        let current_user = client.auth().await?;
        info!(
            username = %current_user.username,
            calendar = %request.calendar_name,
            "authenticated against GitLab, fetching calendar sources"
        );

        let mut project_ids = request.project_ids.clone();
        let group_ids = request.group_ids.clone();
        if project_ids.is_empty() && group_ids.is_empty() {
            // Nothing qualified explicitly: fall back to every project the
            // token is a member of.
            project_ids = client
                .membership_projects()
                .await?
                .into_iter()
                .map(|p| p.id)
                .collect();
        }

        let mut issues: Vec<Issue> = Vec::new();
        let mut milestones: Vec<Milestone> = Vec::new();

        for id in &project_ids {
            if !request.only_milestones {
                issues.extend(client.project_issues(*id).await?);
            }
            if !request.only_issues {
                milestones.extend(client.project_milestones(*id).await?);
            }
        }
        for id in &group_ids {
            if !request.only_milestones {
                issues.extend(client.group_issues(*id).await?);
            }
            if !request.only_issues {
                milestones.extend(client.group_milestones(*id).await?);
            }
        }

        let calendar = build_calendar(&issues, &milestones, request);
        Ok(calendar.to_string().into_bytes())
    }
}

/// Encodes fetched issues and milestones into one combined calendar.
/// Issues without a due date and milestones without any date are skipped.
pub fn build_calendar(
    issues: &[Issue],
    milestones: &[Milestone],
    request: &GenerationRequest,
) -> Calendar {
    let mut calendar = Calendar::new();
    calendar.name(&request.calendar_name);

    for issue in issues {
        let Some(due) = issue.due_date else {
            continue;
        };
        let mut event = icalendar::Event::new();
        event.summary(&format!("{} (Due)", issue.title));
        event.all_day(due);
        if let Some(url) = &issue.web_url {
            event.description(url);
        }
        add_reminder(&mut event, &issue.title, request.reminder_hours);
        calendar.push(event.done());
    }

    for milestone in milestones {
        let mut event = icalendar::Event::new();
        event.summary(&milestone.title);
        match (milestone.start_date, milestone.due_date) {
            (Some(start), Some(due)) => {
                event.starts(start);
                // DTEND is exclusive for date values
                event.ends(due + Duration::days(1));
            }
            (None, Some(due)) => {
                event.all_day(due);
            }
            (Some(start), None) => {
                event.all_day(start);
            }
            (None, None) => continue,
        }
        if let Some(url) = &milestone.web_url {
            event.description(url);
        }
        add_reminder(&mut event, &milestone.title, request.reminder_hours);
        calendar.push(event.done());
    }

    calendar.done()
}

fn add_reminder(event: &mut icalendar::Event, summary: &str, reminder_hours: f64) {
    if reminder_hours <= 0.0 {
        return;
    }
    let minutes = (reminder_hours * 60.0).round() as i64;
    let trigger = Trigger::before_start(Duration::minutes(minutes));
    event.alarm(Alarm::display(summary, trigger));
}
