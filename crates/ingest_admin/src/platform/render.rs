use ingest_core::{AdminViewModel, JobPanelView, JobRunState, ProgressReport, StatsView};

/// Renders the view model as one line per job panel plus a stats line.
pub fn render(view: &AdminViewModel) -> Vec<String> {
    let mut lines: Vec<String> = view.jobs.iter().map(render_job).collect();
    lines.push(render_stats(&view.stats));
    lines
}

fn render_job(job: &JobPanelView) -> String {
    let state = match &job.state {
        JobRunState::Idle => "idle".to_string(),
        JobRunState::Starting => "starting".to_string(),
        JobRunState::Running { progress } => match progress {
            Some(progress) => format!("running {}", render_progress(progress)),
            None => "running".to_string(),
        },
        JobRunState::Succeeded => "succeeded".to_string(),
        JobRunState::Failed(message) => format!("failed: {message}"),
    };
    let control = if job.launch_enabled { "" } else { " [busy]" };
    format!("{:<24}{}{}", job.label, state, control)
}

fn render_progress(progress: &ProgressReport) -> String {
    let mut parts = Vec::new();
    if let Some(percent) = progress.percent {
        parts.push(format!("{percent}%"));
    }
    match (progress.processed, progress.total) {
        (Some(processed), Some(total)) => parts.push(format!("({processed}/{total})")),
        (Some(processed), None) => parts.push(format!("({processed} done)")),
        _ => {}
    }
    if let Some(message) = &progress.message {
        parts.push(format!("- {message}"));
    }
    parts.join(" ")
}

fn render_stats(stats: &StatsView) -> String {
    match stats {
        StatsView::NotLoaded => "Knowledge base: not loaded".to_string(),
        StatsView::Loading => "Knowledge base: loading...".to_string(),
        StatsView::Available(stats) => {
            let mut line = format!(
                "Knowledge base: {} symptoms, {} conditions",
                stats.symptoms, stats.conditions
            );
            if let (Some(diseases), Some(links)) =
                (stats.regional_diseases, stats.regional_symptom_links)
            {
                line.push_str(&format!(" ({diseases} regional diseases, {links} symptom links)"));
            }
            line
        }
        StatsView::Unavailable(message) => format!("Knowledge base: unavailable ({message})"),
    }
}
