use crate::error::Result;
use crate::services::results_service::{ResultsSummary, SCORE_BUCKETS};
use rust_xlsxwriter::*;

pub struct ExportService;

impl ExportService {
    /// Generate a styled XLSX workbook with the leaderboard and score distribution.
    pub fn generate_results_xlsx(summary: &ResultsSummary) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Results")?;

        // ── Color palette ──
        let primary_color = Color::RGB(0x1E293B);
        let header_bg = Color::RGB(0x0F172A);
        let header_text = Color::White;
        let alt_row_1 = Color::RGB(0xF8FAFC);
        let alt_row_2 = Color::White;
        let border_color = Color::RGB(0xE2E8F0);

        let score_high = Color::RGB(0x10B981);
        let score_mid = Color::RGB(0xF59E0B);
        let score_low = Color::RGB(0xEF4444);

        // ── Column definitions ──
        let columns = [
            ("Rank", 8.0),
            ("Participant", 30.0),
            ("Score", 12.0),
            ("Correct", 12.0),
            ("Questions", 12.0),
            ("Percent", 12.0),
            ("Time (s)", 12.0),
        ];

        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        // ── Title row ──
        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(header_text)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        let last_col = (columns.len() - 1) as u16;
        worksheet.set_row_height(0, 36)?;
        let title = match &summary.quiz_title {
            Some(t) => format!("{} ({})", t, summary.code),
            None => format!("Session {}", summary.code),
        };
        worksheet.merge_range(0, 0, 0, last_col, &title, &title_format)?;

        // ── Subtitle row ──
        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        worksheet.set_row_height(1, 22)?;
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
        let subtitle_text = format!(
            "Exported {}  •  {} participants",
            now,
            summary.leaderboard.len()
        );
        worksheet.merge_range(1, 0, 1, last_col, &subtitle_text, &subtitle_format)?;

        // ── Header row ──
        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        let header_row = 2;
        worksheet.set_row_height(header_row, 26)?;
        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        // ── Data rows ──
        let data_start_row = 3;
        for (idx, entry) in summary.leaderboard.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row_1 } else { alt_row_2 };

            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);

            worksheet.set_row_height(row, 20)?;
            worksheet.write_number_with_format(row, 0, entry.rank as f64, &center_fmt)?;
            worksheet.write_string_with_format(
                row,
                1,
                &entry.result.name,
                &base_fmt.clone().set_bold(),
            )?;
            worksheet.write_number_with_format(row, 2, entry.result.score as f64, &center_fmt)?;
            worksheet.write_number_with_format(
                row,
                3,
                entry.result.correct_answers as f64,
                &center_fmt,
            )?;
            worksheet.write_number_with_format(
                row,
                4,
                entry.result.total_questions as f64,
                &center_fmt,
            )?;

            let pct_color = if entry.percentage >= 70.0 {
                score_high
            } else if entry.percentage >= 40.0 {
                score_mid
            } else {
                score_low
            };
            let pct_fmt = center_fmt
                .clone()
                .set_bold()
                .set_font_color(pct_color)
                .set_num_format("0.0");
            worksheet.write_number_with_format(row, 5, entry.percentage, &pct_fmt)?;

            match entry.result.time_taken_seconds {
                Some(t) => worksheet.write_number_with_format(row, 6, t as f64, &center_fmt)?,
                None => worksheet.write_string_with_format(row, 6, "—", &center_fmt)?,
            };
        }

        // ── Summary row ──
        let total_row = data_start_row + summary.leaderboard.len() as u32 + 1;
        let summary_fmt = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(primary_color)
            .set_background_color(Color::RGB(0xE0E7FF))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        worksheet.set_row_height(total_row, 24)?;
        let stats = format!(
            "Average: {:.1}% | Highest: {:.1}% | Lowest: {:.1}%",
            summary.average_percentage, summary.highest_percentage, summary.lowest_percentage
        );
        worksheet.merge_range(total_row, 0, total_row, last_col, &stats, &summary_fmt)?;

        // ── Distribution ──
        let dist_header = total_row + 2;
        worksheet.write_string_with_format(dist_header, 0, "Range", &header_format)?;
        worksheet.write_string_with_format(dist_header, 1, "Participants", &header_format)?;
        for (i, label) in SCORE_BUCKETS.iter().enumerate() {
            let row = dist_header + 1 + i as u32;
            worksheet.write_string(row, 0, *label)?;
            worksheet.write_number(row, 1, summary.distribution[i] as f64)?;
        }

        worksheet.set_freeze_panes(3, 0)?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
