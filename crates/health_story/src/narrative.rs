use crate::error::{Result, StoryError};
use crate::html::html_encode;
use crate::stats::MetricSummary;

use log::info;
use std::path::Path;

/// Narrative fragment for `metric`. Numbers carry two decimals; the metric
/// and area names are HTML-escaped. Same inputs, same bytes.
pub fn story_html(metric: &str, summary: &MetricSummary) -> String {
    let metric = html_encode(metric);
    let max_area = html_encode(&summary.max_area);
    format!(
        "\n<h1>Chicago Public Health Story – {metric}</h1>\n\
         <p>The map above highlights how the <strong>{metric}</strong> indicator varies across Chicago’s 77 community areas.</p>\n\
         \n\
         <p>The citywide average is <strong>{mean:.2}</strong>, but some communities face significantly higher challenges.</p>\n\
         \n\
         <p>The highest value is found in <strong>{max_area}</strong>, reaching <strong>{max:.2}</strong>.  \n\
         This suggests potential disparities in prenatal care, maternal health services, and overall socio-economic conditions.</p>\n\
         \n\
         <p>The bar charts and histogram provide additional context, showing which neighborhoods are most affected and how this indicator is distributed across the city.</p>\n\
         \n\
         <p>Use this story along with the poster and interactive map to support reporting, presentations, or policy discussion.</p>\n",
        metric = metric,
        mean = summary.mean,
        max_area = max_area,
        max = summary.max,
    )
}

pub fn write_story(metric: &str, summary: &MetricSummary, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, story_html(metric, summary)).map_err(|source| {
        StoryError::WriteFile {
            path: output_path.to_path_buf(),
            source,
        }
    })?;
    info!("Story written to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn summary(max_area: &str) -> MetricSummary {
        MetricSummary {
            mean: 15.0,
            max: 20.0,
            max_area: max_area.to_string(),
            count: 2,
        }
    }

    #[test]
    fn test_story_figures() {
        let html = story_html("Low Birth Weight", &summary("AreaTwo"));
        assert!(html.starts_with("\n<h1>Chicago Public Health Story – Low Birth Weight</h1>\n"));
        assert!(html.contains("The citywide average is <strong>15.00</strong>"));
        assert!(html.contains(
            "The highest value is found in <strong>AreaTwo</strong>, reaching <strong>20.00</strong>.  \nThis suggests"
        ));
        assert!(html.ends_with("policy discussion.</p>\n"));
        assert_eq!(html.matches("<p>").count(), 5);
    }

    #[test]
    fn test_story_escapes_names() {
        let html = story_html("Rate <per 1,000>", &summary("Back of the Yards & Co"));
        assert!(html.contains("Rate &lt;per 1,000&gt;"));
        assert!(html.contains("<strong>Back of the Yards &amp; Co</strong>"));
        assert!(!html.contains("<per"));
    }

    #[test]
    fn test_rewrite_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("story.html");

        write_story("Low Birth Weight", &summary("AreaTwo"), &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        write_story("Low Birth Weight", &summary("AreaTwo"), &path).unwrap();
        assert_eq!(first, std::fs::read(&path).unwrap());
    }
}
