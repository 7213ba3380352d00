//! Render functions mapping feed data to view trees.
//!
//! Each feed has a content renderer and a placeholder. Placeholder text is in
//! Indonesian, matching the rest of the site.

use crate::models::{FacilityItem, GalleryItem, ScheduleRow, TestimonialItem};
use crate::view::{el, fragment, Element, Node};

pub const SCHEDULE_COLUMNS: usize = 8;
pub const AVAILABLE_LABEL: &str = "Tersedia";
pub const SCHEDULE_EMPTY: &str = "Belum ada jadwal tersedia.";
pub const TIME_SLOT_PROMPT: &str = "Pilih jam";
pub const TIME_SLOT_EMPTY: &str = "Jam belum tersedia";
pub const TESTIMONIAL_EMPTY: &str = "Belum ada testimoni tersedia. Jadilah yang pertama!";
pub const TESTIMONIAL_EMPTY_NAME: &str = "Anda";
pub const FACILITY_EMPTY: &str = "Belum ada data fasilitas.";
pub const FACILITY_FAILED: &str = "Gagal memuat fasilitas. Coba lagi nanti.";
pub const GALLERY_EMPTY: &str = "Belum ada foto di galeri.";
pub const GALLERY_FAILED: &str = "Gagal memuat galeri. Coba lagi nanti.";
pub const GALLERY_ALT: &str = "Galeri Ant Arena";

const MAX_STARS: usize = 5;

// ---- schedule -------------------------------------------------------------

pub fn schedule_rows(rows: &[ScheduleRow]) -> Node {
    fragment(rows.iter().map(schedule_row))
}

fn schedule_row(row: &ScheduleRow) -> Node {
    let day_cells = row.days().map(|day| match day {
        Some(label) => Node::from(el("td").text(label)),
        None => Node::from(el("td").child(el("span").class("text-success").text(AVAILABLE_LABEL))),
    });

    el("tr")
        .child(el("td").class("time-slot").text(row.jam.as_str()))
        .children(day_cells)
        .into()
}

pub fn schedule_placeholder() -> Node {
    schedule_message("text-center", SCHEDULE_EMPTY.to_string())
}

pub fn schedule_error(reason: &str) -> Node {
    schedule_message("text-danger text-center", format!("Error loading jadwal: {reason}"))
}

fn schedule_message(class: &'static str, message: String) -> Node {
    el("tr")
        .child(
            el("td")
                .attr("colspan", SCHEDULE_COLUMNS.to_string())
                .class(class)
                .text(message),
        )
        .into()
}

// ---- time slots -----------------------------------------------------------

fn prompt_option() -> Node {
    el("option").attr("value", "").text(TIME_SLOT_PROMPT).into()
}

pub fn time_slot_options(slots: &[String]) -> Node {
    let options = slots
        .iter()
        .map(|slot| Node::from(el("option").attr("value", slot.as_str()).text(slot.as_str())));
    fragment(std::iter::once(prompt_option()).chain(options))
}

pub fn time_slot_placeholder() -> Node {
    let unavailable = el("option")
        .attr("value", "")
        .attr("disabled", "disabled")
        .text(TIME_SLOT_EMPTY);
    fragment([prompt_option(), unavailable.into()])
}

// ---- testimonials ---------------------------------------------------------

/// Five star icons for a 0..=5 rating, half stars for the fractional part.
pub fn stars(rating: f64) -> Vec<Node> {
    let full = rating.floor();
    (0..MAX_STARS)
        .map(|position| {
            let position = position as f64;
            let icon = if position < full {
                "bi bi-star-fill"
            } else if position < rating {
                "bi bi-star-half"
            } else {
                "bi bi-star"
            };
            Node::from(el("i").class(icon))
        })
        .collect()
}

fn testimonial_slide(message: &str, name: &str, rating: f64, photo: Option<&str>) -> Node {
    let content = el("div").class("col-lg-6").child(
        el("div")
            .class("testimonial-content")
            .child(
                el("p")
                    .child(el("i").class("bi bi-quote quote-icon-left"))
                    .child(el("span").text(message))
                    .child(el("i").class("bi bi-quote quote-icon-right")),
            )
            .child(el("h3").text(name))
            .child(el("div").class("stars").children(stars(rating))),
    );

    let photo_column = photo.map(|url| {
        Node::from(
            el("div").class("col-lg-2 text-center").child(
                el("img")
                    .attr("src", url)
                    .class("img-fluid testimonial-img")
                    .attr("alt", ""),
            ),
        )
    });

    el("div")
        .class("swiper-slide")
        .child(
            el("div").class("testimonial-item").child(
                el("div")
                    .class("row gy-4 justify-content-center")
                    .child(content)
                    .children(photo_column),
            ),
        )
        .into()
}

pub fn testimonial_slides(items: &[TestimonialItem]) -> Node {
    fragment(items.iter().map(|item| {
        testimonial_slide(item.message(), item.display_name(), item.display_rating(), item.photo())
    }))
}

pub fn testimonial_placeholder() -> Node {
    testimonial_slide(
        TESTIMONIAL_EMPTY,
        TESTIMONIAL_EMPTY_NAME,
        TestimonialItem::DEFAULT_RATING,
        None,
    )
}

// ---- facilities & gallery -------------------------------------------------

fn slide_message(message: &str) -> Node {
    el("div").class("swiper-slide").child(el("p").text(message)).into()
}

fn css_url(url: &str) -> String {
    format!("background-image: url('{}')", url.replace('\'', "%27"))
}

pub fn facility_slides(items: &[FacilityItem]) -> Node {
    fragment(items.iter().map(|item| {
        Node::from(
            el("div")
                .class("swiper-slide event-item d-flex flex-column justify-content-end")
                .attr("style", css_url(&item.foto_url))
                .child(el("h3").text(item.nama.as_str()))
                .child(el("p").class("description").text(item.deskripsi.as_str())),
        )
    }))
}

pub fn facility_placeholder(failed: bool) -> Node {
    slide_message(if failed { FACILITY_FAILED } else { FACILITY_EMPTY })
}

pub fn gallery_slides(items: &[GalleryItem]) -> Node {
    fragment(
        items
            .iter()
            .map(|item| Node::from(el("div").class("swiper-slide").child(gallery_link(&item.url)))),
    )
}

fn gallery_link(url: &str) -> Element {
    el("a")
        .class("glightbox")
        .attr("data-gallery", "images-gallery")
        .attr("href", url)
        .child(
            el("img")
                .attr("src", url)
                .class("img-fluid")
                .attr("alt", GALLERY_ALT),
        )
}

pub fn gallery_placeholder(failed: bool) -> Node {
    slide_message(if failed { GALLERY_FAILED } else { GALLERY_EMPTY })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(nodes: &[Node]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| match node {
                Node::Element(element) => element.get_attr("class").unwrap_or_default().to_string(),
                _ => String::new(),
            })
            .collect()
    }

    #[test]
    fn booked_and_available_days_render_per_column() {
        let row = ScheduleRow {
            jam: "08:00".into(),
            senin: Some("Booked".into()),
            ..Default::default()
        };
        let html = schedule_rows(&[row]).render();

        assert!(html.starts_with("<tr><td class=\"time-slot\">08:00</td><td>Booked</td>"));
        assert_eq!(html.matches(AVAILABLE_LABEL).count(), 6);
        assert_eq!(html.matches("<td").count(), SCHEDULE_COLUMNS);
    }

    #[test]
    fn schedule_error_escapes_reason() {
        let html = schedule_error("<b>boom</b>").render();
        assert!(html.contains("colspan=\"8\""));
        assert!(html.contains("text-danger"));
        assert!(html.contains("Error loading jadwal: &lt;b&gt;boom&lt;/b&gt;"));
    }

    #[test]
    fn stars_cover_full_half_and_empty() {
        assert_eq!(
            classes(&stars(3.5)),
            [
                "bi bi-star-fill",
                "bi bi-star-fill",
                "bi bi-star-fill",
                "bi bi-star-half",
                "bi bi-star"
            ]
        );
        assert!(classes(&stars(5.0)).iter().all(|class| class == "bi bi-star-fill"));
        assert!(classes(&stars(0.0)).iter().all(|class| class == "bi bi-star"));
    }

    #[test]
    fn testimonial_escapes_user_text_and_shows_photo() {
        let item = TestimonialItem {
            nama: Some("<img src=x>".into()),
            pesan: Some("Mantap & bersih".into()),
            rating: Some(4.0),
            foto: Some("uploads/a.jpg".into()),
        };
        let html = testimonial_slides(&[item]).render();

        assert!(html.contains("<h3>&lt;img src=x&gt;</h3>"));
        assert!(html.contains("Mantap &amp; bersih"));
        assert!(html.contains("src=\"uploads/a.jpg\""));
        assert_eq!(html.matches("bi-star-fill").count(), 4);
    }

    #[test]
    fn testimonial_placeholder_has_five_stars() {
        let node = testimonial_placeholder();
        assert!(node.text_content().contains(TESTIMONIAL_EMPTY));
        assert_eq!(node.render().matches("bi-star-fill").count(), 5);
    }

    #[test]
    fn time_slots_keep_prompt_first() {
        let html = time_slot_options(&["08:00".into(), "09:00".into()]).render();
        assert_eq!(
            html,
            "<option value=\"\">Pilih jam</option>\
             <option value=\"08:00\">08:00</option>\
             <option value=\"09:00\">09:00</option>"
        );
    }

    #[test]
    fn time_slot_placeholder_offers_only_disabled_option() {
        let html = time_slot_placeholder().render();
        assert_eq!(
            html,
            "<option value=\"\">Pilih jam</option>\
             <option value=\"\" disabled=\"disabled\">Jam belum tersedia</option>"
        );
    }

    #[test]
    fn facility_and_gallery_values_are_escaped() {
        let facility = FacilityItem {
            nama: "<Futsal>".into(),
            deskripsi: "Lapangan \"vinyl\"".into(),
            foto_url: "a'.jpg".into(),
        };
        let html = facility_slides(&[facility]).render();
        assert!(html.contains("&lt;Futsal&gt;"));
        assert!(html.contains("Lapangan &quot;vinyl&quot;"));
        assert!(html.contains("url(&#x27;a%27.jpg&#x27;)"));

        let html = gallery_slides(&[GalleryItem { url: "x\"><script>".into() }]).render();
        assert!(!html.contains("<script>"));
        assert!(html.contains(GALLERY_ALT));
    }

    #[test]
    fn placeholders_distinguish_empty_from_failed() {
        assert!(facility_placeholder(false).text_content().contains(FACILITY_EMPTY));
        assert!(facility_placeholder(true).text_content().contains(FACILITY_FAILED));
        assert!(gallery_placeholder(false).text_content().contains(GALLERY_EMPTY));
        assert!(gallery_placeholder(true).text_content().contains(GALLERY_FAILED));
    }
}
