use crate::loader::Feed;
use crate::polish::MobileNav;
use crate::view::escape_html;
use std::collections::BTreeMap;

/// Page shell with every widget container filled from the latest fragments.
/// A feed missing from `fragments` leaves its container empty.
pub fn render_index(fragments: &BTreeMap<Feed, String>, min_date: &str) -> String {
    let fragment = |feed: Feed| fragments.get(&feed).map(String::as_str).unwrap_or_default();

    INDEX_HTML
        .replace("{{HAMBURGER}}", &MobileNav::hamburger_markup().render())
        .replace("{{JADWAL}}", fragment(Feed::Schedule))
        .replace("{{JAM}}", fragment(Feed::TimeSlots))
        .replace("{{TESTIMONI}}", fragment(Feed::Testimonials))
        .replace("{{FASILITAS}}", fragment(Feed::Facilities))
        .replace("{{GALERI}}", fragment(Feed::Gallery))
        .replace("{{MIN_DATE}}", &escape_html(min_date))
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="id">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Ant Arena</title>
  <style>
    body { margin: 0; font-family: "Segoe UI", sans-serif; color: #1f2933; }
    header { position: sticky; top: 0; z-index: 10; background: #fff; transition: box-shadow 200ms; }
    header.scrolled { box-shadow: 0 6px 18px rgba(0, 0, 0, 0.12); }
    .navbar { display: flex; gap: 18px; align-items: center; padding: 14px 24px; }
    .hamburger { display: none; }
    section { padding: 48px 24px; }
    .reveal { opacity: 0; transform: translateY(24px); transition: opacity 500ms, transform 500ms; }
    .reveal.is-visible { opacity: 1; transform: none; }
    .testimonial-track { display: flex; gap: 24px; overflow-x: auto; scroll-snap-type: x mandatory; scroll-behavior: smooth; }
    .testimonial-track > .swiper-slide { flex: 0 0 min(100%, 360px); scroll-snap-align: start; }
    .text-success { color: #1a7f37; }
    .text-danger { color: #c62828; }
    @media (max-width: 768px) {
      .hamburger { display: inline-block; }
      .navbar .nav-links { display: none; }
      body.nav-open .navbar .nav-links { display: flex; flex-direction: column; }
    }
    @media (prefers-reduced-motion: reduce) {
      .reveal { transition: none; }
      .testimonial-track { scroll-behavior: auto; }
    }
  </style>
</head>
<body>
  <header id="header">
    <nav class="navbar">
      <a class="brand" href="#hero">Ant Arena</a>
      {{HAMBURGER}}
      <div class="nav-links">
        <a href="#jadwal">Jadwal</a>
        <a href="#reservasi">Reservasi</a>
        <a href="#testimoni">Testimoni</a>
        <a href="#fasilitas">Fasilitas</a>
        <a href="#galeri">Galeri</a>
      </div>
    </nav>
  </header>

  <section id="hero" class="hero">
    <h1>Ant Arena</h1>
    <p>Lapangan futsal dan badminton, booking online.</p>
  </section>

  <section id="jadwal" class="reveal">
    <h2>Jadwal Lapangan</h2>
    <table class="table">
      <thead>
        <tr><th>Jam</th><th>Senin</th><th>Selasa</th><th>Rabu</th><th>Kamis</th><th>Jumat</th><th>Sabtu</th><th>Minggu</th></tr>
      </thead>
      <tbody id="jadwalBody">{{JADWAL}}</tbody>
    </table>
  </section>

  <section id="reservasi" class="reveal">
    <h2>Reservasi</h2>
    <form id="reservasiForm" method="post" action="/reservasi">
      <input type="text" name="nama" placeholder="Nama" required />
      <input type="tel" name="no_hp" placeholder="No. HP" required />
      <input type="date" id="tanggal_mulai" name="tanggal_mulai" min="{{MIN_DATE}}" required />
      <select id="jam_mulai" name="jam_mulai" required>{{JAM}}</select>
      <button type="submit" id="submitBtn">Kirim</button>
      <div id="loadingIndicator" hidden>Mengirim...</div>
      <div id="successMessage" hidden>Reservasi berhasil dikirim!</div>
      <div id="errorMessage" hidden></div>
    </form>
  </section>

  <section id="testimoni" class="reveal">
    <h2>Testimoni</h2>
    <div class="testimonial-carousel">
      <button class="prev" aria-label="Sebelumnya">&lsaquo;</button>
      <div id="testimoniWrapper" class="testimonial-track">{{TESTIMONI}}</div>
      <button class="next" aria-label="Berikutnya">&rsaquo;</button>
    </div>
  </section>

  <section id="fasilitas" class="reveal">
    <h2>Fasilitas</h2>
    <div id="fasilitasWrapper" class="swiper-wrapper">{{FASILITAS}}</div>
  </section>

  <section id="galeri" class="reveal">
    <h2>Galeri</h2>
    <div id="galeriWrapper" class="swiper-wrapper">{{GALERI}}</div>
  </section>

  <script>
    const form = document.getElementById('reservasiForm');
    const submitBtn = document.getElementById('submitBtn');
    const loading = document.getElementById('loadingIndicator');
    const success = document.getElementById('successMessage');
    const errorBox = document.getElementById('errorMessage');

    const applyView = (view) => {
      submitBtn.disabled = Boolean(view.submit_disabled);
      loading.hidden = !view.loading_visible;
      success.hidden = !view.success_visible;
      errorBox.hidden = !view.error_message;
      errorBox.textContent = view.error_message || '';
      if (view.scroll_to_success) {
        success.scrollIntoView({ behavior: 'smooth', block: 'center' });
      }
    };

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      applyView({ submit_disabled: true, loading_visible: true });
      try {
        const res = await fetch(form.action, {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify(Object.fromEntries(new FormData(form)))
        });
        const view = await res.json();
        applyView(view);
        if (view.success_visible) {
          form.reset();
        }
      } catch (err) {
        applyView({ error_message: 'Terjadi kesalahan saat mengirim data' });
      }
    });

    const track = document.getElementById('testimoniWrapper');
    document.querySelectorAll('.testimonial-carousel .prev, .testimonial-carousel .next').forEach((button) => {
      button.addEventListener('click', () => {
        const card = track.querySelector('.swiper-slide');
        const step = card ? card.getBoundingClientRect().width + 24 : track.clientWidth;
        track.scrollBy({ left: button.classList.contains('next') ? step : -step });
      });
    });
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_land_in_their_containers() {
        let fragments = BTreeMap::from([
            (Feed::Schedule, "<tr><td>08:00</td></tr>".to_string()),
            (Feed::Gallery, "<div class=\"swiper-slide\"></div>".to_string()),
        ]);
        let html = render_index(&fragments, "2026-10-17");

        assert!(html.contains(r#"<tbody id="jadwalBody"><tr><td>08:00</td></tr></tbody>"#));
        assert!(html.contains(r#"<div id="galeriWrapper" class="swiper-wrapper"><div class="swiper-slide"></div></div>"#));
        assert!(html.contains(r#"min="2026-10-17""#));
    }

    #[test]
    fn unsettled_feeds_leave_containers_empty() {
        let html = render_index(&BTreeMap::new(), "2026-10-17");
        assert!(html.contains(r#"<div id="testimoniWrapper" class="testimonial-track"></div>"#));
        assert!(html.contains(r#"<select id="jam_mulai" name="jam_mulai" required></select>"#));
        assert!(!html.contains("{{"));
    }

    fn form_tag(html: &str) -> &str {
        let start = html.find("<form").unwrap();
        let end = start + html[start..].find('>').unwrap();
        &html[start..=end]
    }

    #[test]
    fn reservation_form_posts_to_reservation_route() {
        let html = render_index(&BTreeMap::new(), "2026-10-17");
        let tag = form_tag(&html);
        assert!(tag.contains(r#"method="post""#));
        assert!(tag.contains(r#"action="/reservasi""#));
        for name in ["nama", "no_hp", "tanggal_mulai", "jam_mulai"] {
            assert!(html.contains(&format!(r#"name="{name}""#)));
        }
    }

    #[test]
    fn script_sends_form_as_json() {
        let html = render_index(&BTreeMap::new(), "2026-10-17");
        assert!(html.contains("<script>"));
        assert!(html.contains("fetch(form.action"));
        assert!(html.contains("'content-type': 'application/json'"));
    }

    #[test]
    fn page_ships_with_a_hamburger() {
        let html = render_index(&BTreeMap::new(), "2026-10-17");
        assert!(html.contains(r#"class="hamburger""#));
    }
}
