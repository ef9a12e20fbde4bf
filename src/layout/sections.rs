//! Header and per-section builders.

use super::{Cursor, DrawCommand, ElementRole, LayoutElement, PageBuilder, PAGE_WIDTH_PX, PHOTO_SIZE};
use crate::content::{date_range, split_bullets, with_content, SectionKind};
use crate::model::*;
use crate::style::{Color, TextAlign, TextStyle};

/// Vertical space between entries of one section.
const ENTRY_GAP: f64 = 8.0;
/// Horizontal space between a heading and its right-aligned date.
const DATE_GAP: f64 = 12.0;
const PHOTO_GAP: f64 = 16.0;
const CONTACT_SEPARATOR: &str = "  |  ";

/// Join the non-blank parts with `sep`.
fn join_filled<'s>(parts: impl IntoIterator<Item = &'s str>, sep: &str) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Example content shown for an empty section in preview.
fn placeholder_lines(kind: SectionKind) -> &'static [&'static str] {
    match kind {
        SectionKind::Summary => &[
            "A results-driven professional with a track record of delivering measurable impact. \
             Summarize your experience and what you bring to the role.",
        ],
        SectionKind::Experience => &[
            "Job Title",
            "Company Name  |  2020 - Present",
            "• Describe a key achievement with a concrete result",
            "• Highlight a responsibility relevant to the role",
        ],
        SectionKind::Education => &["Degree in Field of Study", "University Name  |  2016 - 2020"],
        SectionKind::Skills => &["Communication · Leadership · Problem Solving"],
        SectionKind::Tools => &["Git · Figma · Jira"],
        SectionKind::Languages => &["English (Native)", "Spanish (Intermediate)"],
        SectionKind::Certifications => &["Certification Name", "Issuing Organization  |  2023"],
        SectionKind::Projects => &[
            "Project Name",
            "• Explain what you built and the outcome",
        ],
    }
}

impl PageBuilder<'_> {
    /// Lay out the name, title, contact line and photo. Returns the y where
    /// the body starts.
    pub(super) fn header(&mut self, doc: &ResumeDocument, mut cursor: Cursor) -> f64 {
        let d = self.descriptor;
        let scale = d.type_scale;
        let personal = &doc.personal;
        let (name_color, title_color, contact_color) = if d.header_band {
            (Color::WHITE, Color::WHITE, Color::WHITE)
        } else {
            (self.style.text.primary, self.style.accent, self.style.text.muted)
        };
        let band_index = self.elements.len();
        let top = cursor.y;

        let mut photo_bottom = top;
        if let Some(src) = personal.photo.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            self.push(LayoutElement {
                x: cursor.x + cursor.width - PHOTO_SIZE,
                y: top,
                width: PHOTO_SIZE,
                height: PHOTO_SIZE,
                draw: DrawCommand::Image { src: src.to_string() },
                role: ElementRole::Photo,
            });
            photo_bottom = top + PHOTO_SIZE;
            let reserve = PHOTO_SIZE + PHOTO_GAP;
            if d.header_align == TextAlign::Center {
                cursor = cursor.indented(reserve);
            }
            cursor.width = (cursor.width - reserve).max(0.0);
        }

        let name_style = self.text_style(scale.name, name_color).bold();
        if !personal.full_name.trim().is_empty() {
            self.paragraph(&mut cursor, personal.full_name.trim(), name_style, d.header_align, ElementRole::Name);
        } else if self.placeholders() {
            self.paragraph(&mut cursor, "Your Name", name_style.italic(), d.header_align, ElementRole::Placeholder);
        }

        let title_style = self.text_style(scale.title, title_color);
        match personal.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => self.paragraph(&mut cursor, title, title_style, d.header_align, ElementRole::Title),
            None if self.placeholders() => self.paragraph(
                &mut cursor,
                "Professional Title",
                title_style.italic(),
                d.header_align,
                ElementRole::Placeholder,
            ),
            None => {}
        }

        cursor.y += 4.0;
        let contact_style = self.text_style(scale.meta, contact_color);
        let mut fields = vec![personal.email.as_str(), personal.phone.as_str(), personal.location.as_str()];
        fields.extend(personal.links());
        let contact = join_filled(fields, CONTACT_SEPARATOR);
        if !contact.is_empty() {
            self.paragraph(&mut cursor, &contact, contact_style, d.header_align, ElementRole::Contact);
        } else if self.placeholders() {
            self.paragraph(
                &mut cursor,
                "email@example.com  |  (555) 123-4567  |  City, State",
                contact_style.italic(),
                d.header_align,
                ElementRole::Placeholder,
            );
        }

        let bottom = cursor.y.max(photo_bottom);
        if d.header_band {
            let band_bottom = bottom + d.padding.top / 2.0;
            self.elements.insert(
                band_index,
                LayoutElement {
                    x: 0.0,
                    y: 0.0,
                    width: PAGE_WIDTH_PX,
                    height: band_bottom,
                    draw: DrawCommand::Rect { fill: self.style.accent },
                    role: ElementRole::Background,
                },
            );
            band_bottom + d.section_gap + 8.0
        } else {
            let mut rule = Cursor::new(d.padding.left, PAGE_WIDTH_PX - d.padding.horizontal(), bottom + 8.0);
            self.rule(&mut rule, self.style.accent, 2.0);
            rule.y + d.section_gap
        }
    }

    /// Lay out one section, or its placeholder in preview, or nothing.
    pub(super) fn section(&mut self, doc: &ResumeDocument, kind: SectionKind, cursor: &mut Cursor) {
        let has_content = doc.section_has_content(kind);
        if !has_content && !self.placeholders() {
            return;
        }

        self.section_header(kind, cursor);
        if has_content {
            match kind {
                SectionKind::Summary => self.summary(&doc.summary, cursor),
                SectionKind::Experience => {
                    for (i, e) in with_content(&doc.experience).enumerate() {
                        if i > 0 {
                            cursor.y += ENTRY_GAP;
                        }
                        self.experience(e, cursor);
                    }
                }
                SectionKind::Education => {
                    for (i, e) in with_content(&doc.education).enumerate() {
                        if i > 0 {
                            cursor.y += ENTRY_GAP;
                        }
                        self.education(e, cursor);
                    }
                }
                SectionKind::Skills => {
                    let names = with_content(&doc.skills).map(|s| s.name.as_str());
                    self.name_list(join_filled(names, " · "), cursor);
                }
                SectionKind::Tools => {
                    let names = with_content(&doc.tools).map(|t| t.name.as_str());
                    self.name_list(join_filled(names, " · "), cursor);
                }
                SectionKind::Languages => {
                    for lang in with_content(&doc.languages) {
                        let text = format!("{} ({})", lang.name.trim(), lang.proficiency);
                        self.name_list(text, cursor);
                    }
                }
                SectionKind::Certifications => {
                    for (i, c) in with_content(&doc.certifications).enumerate() {
                        if i > 0 {
                            cursor.y += ENTRY_GAP / 2.0;
                        }
                        self.certification(c, cursor);
                    }
                }
                SectionKind::Projects => {
                    for (i, p) in with_content(&doc.projects).enumerate() {
                        if i > 0 {
                            cursor.y += ENTRY_GAP;
                        }
                        self.project(p, cursor);
                    }
                }
            }
        } else {
            let style = self.body_style(self.style.text.muted).italic();
            for line in placeholder_lines(kind) {
                self.paragraph(cursor, line, style, TextAlign::Left, ElementRole::Placeholder);
            }
        }
        cursor.y += self.descriptor.section_gap;
    }

    fn body_style(&self, color: Color) -> TextStyle {
        self.text_style(self.descriptor.type_scale.body, color)
    }

    fn meta_style(&self, color: Color) -> TextStyle {
        self.text_style(self.descriptor.type_scale.meta, color)
    }

    fn heading_style(&self) -> TextStyle {
        self.text_style(self.descriptor.type_scale.entry_heading, self.style.text.primary)
            .bold()
    }

    fn section_header(&mut self, kind: SectionKind, cursor: &mut Cursor) {
        let size = self.descriptor.type_scale.section_header;
        let style = self
            .text_style(size, self.style.accent)
            .bold()
            .with_letter_spacing(size.size * 0.06);
        self.paragraph(cursor, &kind.title().to_uppercase(), style, TextAlign::Left, ElementRole::SectionTitle);
        cursor.y += 2.0;
        self.rule(cursor, self.style.accent, 1.0);
        cursor.y += 6.0;
    }

    /// An entry heading with a right-aligned date on the same line. In a
    /// column too narrow for both, the date goes on its own line below.
    fn heading_row(&mut self, cursor: &mut Cursor, heading: &str, dates: &str) {
        let heading_style = self.heading_style();
        let date_style = self.meta_style(self.style.text.muted);
        let date_width = if dates.is_empty() {
            0.0
        } else {
            self.text.measure(dates, &date_style)
        };
        let inline = date_width > 0.0 && date_width + DATE_GAP <= cursor.width / 2.0;

        if inline {
            let y = cursor.y + (heading_style.line_height() - date_style.line_height()) / 2.0;
            self.line(
                cursor.x + cursor.width - date_width,
                y,
                dates.to_string(),
                date_width,
                date_style,
                ElementRole::DateRange,
            );
            let mut narrowed = *cursor;
            narrowed.width -= date_width + DATE_GAP;
            self.paragraph(&mut narrowed, heading, heading_style, TextAlign::Left, ElementRole::EntryHeading);
            cursor.y = narrowed.y.max(cursor.y + heading_style.line_height());
        } else {
            self.paragraph(cursor, heading, heading_style, TextAlign::Left, ElementRole::EntryHeading);
            if !dates.is_empty() {
                self.paragraph(cursor, dates, date_style, TextAlign::Left, ElementRole::DateRange);
            }
        }
    }

    fn bullets(&mut self, description: &str, cursor: &mut Cursor) {
        let style = self.body_style(self.style.text.secondary);
        let bullets = split_bullets(description);
        if !bullets.is_empty() {
            cursor.y += 2.0;
        }
        for text in bullets {
            self.bullet(cursor, &text, style, ElementRole::Body);
        }
    }

    fn summary(&mut self, summary: &str, cursor: &mut Cursor) {
        let style = self.body_style(self.style.text.secondary);
        self.paragraph(cursor, summary.trim(), style, TextAlign::Left, ElementRole::Body);
    }

    fn experience(&mut self, e: &ExperienceEntry, cursor: &mut Cursor) {
        let location = e.location.as_deref().unwrap_or("");
        let (heading, org) = if e.position.trim().is_empty() {
            (e.company.trim().to_string(), location.trim().to_string())
        } else {
            (e.position.trim().to_string(), join_filled([e.company.as_str(), location], " · "))
        };
        let dates = date_range(&e.start_date, e.end_date.as_deref(), e.current);
        self.heading_row(cursor, &heading, &dates);
        if !org.is_empty() {
            let style = self.meta_style(self.style.text.secondary).italic();
            self.paragraph(cursor, &org, style, TextAlign::Left, ElementRole::Body);
        }
        self.bullets(&e.description, cursor);
    }

    fn education(&mut self, e: &EducationEntry, cursor: &mut Cursor) {
        let degree = match (e.degree.trim(), e.field.trim()) {
            ("", "") => String::new(),
            (degree, "") => degree.to_string(),
            ("", field) => field.to_string(),
            (degree, field) => format!("{degree} in {field}"),
        };
        let location = e.location.as_deref().unwrap_or("");
        let (heading, org) = if degree.is_empty() {
            (e.school.trim().to_string(), location.trim().to_string())
        } else {
            (degree, join_filled([e.school.as_str(), location], " · "))
        };
        let dates = date_range(&e.start_date, e.end_date.as_deref(), false);
        self.heading_row(cursor, &heading, &dates);
        if !org.is_empty() {
            let style = self.meta_style(self.style.text.secondary).italic();
            self.paragraph(cursor, &org, style, TextAlign::Left, ElementRole::Body);
        }
        if let Some(gpa) = e.gpa.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
            let style = self.meta_style(self.style.text.muted);
            self.paragraph(cursor, gpa, style, TextAlign::Left, ElementRole::Body);
        }
    }

    fn name_list(&mut self, text: String, cursor: &mut Cursor) {
        let style = self.body_style(self.style.text.secondary);
        self.paragraph(cursor, &text, style, TextAlign::Left, ElementRole::Body);
    }

    fn certification(&mut self, c: &CertificationEntry, cursor: &mut Cursor) {
        let style = self.body_style(self.style.text.primary).bold();
        self.paragraph(cursor, c.name.trim(), style, TextAlign::Left, ElementRole::EntryHeading);
        let meta = join_filled(
            [c.issuer.as_deref().unwrap_or(""), c.date.as_deref().unwrap_or("")],
            " · ",
        );
        if !meta.is_empty() {
            let style = self.meta_style(self.style.text.muted);
            self.paragraph(cursor, &meta, style, TextAlign::Left, ElementRole::Body);
        }
    }

    fn project(&mut self, p: &ProjectEntry, cursor: &mut Cursor) {
        self.heading_row(cursor, p.name.trim(), "");
        if let Some(tech) = p.technologies.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let style = self.meta_style(self.style.text.muted).italic();
            self.paragraph(cursor, tech, style, TextAlign::Left, ElementRole::Body);
        }
        let links = join_filled(
            [p.link.as_deref().unwrap_or(""), p.repository.as_deref().unwrap_or("")],
            CONTACT_SEPARATOR,
        );
        if !links.is_empty() {
            let style = self.meta_style(self.style.accent);
            self.paragraph(cursor, &links, style, TextAlign::Left, ElementRole::Body);
        }
        self.bullets(&p.description, cursor);
    }
}
