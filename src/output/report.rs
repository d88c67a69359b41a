use super::{encode_uri, escape_html, CardRecord, NO_RESULTS_MESSAGE};

const PAGE_TITLE: &str = "Diretório de Fornecedores";

fn detail_haystack(r: &CardRecord) -> String {
    [
        Some(r.name.as_str()),
        r.short.as_deref(),
        r.description.as_deref(),
        r.service.as_deref(),
        r.sector.as_deref(),
        r.contact.as_deref(),
    ]
    .iter()
    .map(|f| f.unwrap_or(""))
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

fn render_badge(out: &mut String, r: &CardRecord) {
    let alt = escape_html(r.alt_text.as_deref().unwrap_or(&r.name));
    match r.badge.as_str() {
        "logo" => {
            let src = escape_html(&encode_uri(r.logo_url.as_deref().unwrap_or("")));
            out.push_str(&format!(
                "      <img class=\"card-logo\" src=\"{src}\" alt=\"{alt}\"/>\n"
            ));
        }
        "pending" if !r.logo_candidates.is_empty() => {
            // unprobed logos carry their candidate chain; the page script
            // advances through it on image error
            let candidates: Vec<String> =
                r.logo_candidates.iter().map(|c| encode_uri(c)).collect();
            let data = escape_html(&serde_json::to_string(&candidates).unwrap_or_default());
            out.push_str(&format!(
                "      <img class=\"card-logo\" data-candidates=\"{data}\" alt=\"{alt}\"/>\n"
            ));
            out.push_str(
                "      <div class=\"badge-fallback\" hidden><span>SELO</span><span>VERDE</span></div>\n",
            );
        }
        _ => {
            out.push_str(
                "      <div class=\"badge-fallback\"><span>SELO</span><span>VERDE</span></div>\n",
            );
        }
    }
}

fn render_card(out: &mut String, index: usize, r: &CardRecord) {
    out.push_str(&format!(
        "    <article class=\"card\" tabindex=\"0\" data-index=\"{index}\" data-name=\"{}\" data-sector=\"{}\" data-haystack=\"{}\" aria-haspopup=\"dialog\">\n",
        escape_html(&r.name),
        escape_html(r.sector.as_deref().unwrap_or("")),
        escape_html(&detail_haystack(r)),
    ));
    render_badge(out, r);
    out.push_str(&format!("      <h3>{}</h3>\n", escape_html(&r.name)));
    out.push_str(&format!(
        "      <p class=\"card-sector\">{}</p>\n",
        escape_html(&r.sector_label)
    ));
    out.push_str(&format!(
        "      <p class=\"card-summary\">{}</p>\n",
        escape_html(&r.summary)
    ));
    out.push_str("    </article>\n");
}

fn render_detail_template(out: &mut String, index: usize, r: &CardRecord) {
    out.push_str(&format!("  <template id=\"detail-{index}\">\n"));
    if let Some(short) = r.short.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        out.push_str(&format!(
            "    <p class=\"detail-short\">{}</p>\n",
            escape_html(short)
        ));
    }
    out.push_str(&format!(
        "    <p><strong>Setor:</strong> {}</p>\n",
        escape_html(&r.sector_label)
    ));
    if let Some(selo) = r.selo.as_deref() {
        out.push_str(&format!(
            "    <p><strong>Selo:</strong> {}</p>\n",
            escape_html(selo)
        ));
    }
    if let Some(service) = r.service.as_deref() {
        out.push_str(&format!(
            "    <p><strong>Serviço:</strong> {}</p>\n",
            escape_html(service)
        ));
    }
    if let Some(contact) = r.contact.as_deref() {
        out.push_str(&format!(
            "    <p><strong>Contato:</strong> {}</p>\n",
            escape_html(contact)
        ));
    }
    if let Some(website) = r.website.as_deref() {
        out.push_str(&format!(
            "    <p><strong>Site:</strong> <a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></p>\n",
            escape_html(&encode_uri(website)),
            escape_html(website),
        ));
    }
    if let Some(description) = r.description.as_deref() {
        out.push_str(&format!(
            "    <p class=\"detail-description\">{}</p>\n",
            escape_html(description)
        ));
    }
    if !r.practices.is_empty() {
        out.push_str(&format!(
            "    <p><strong>Práticas:</strong> {}</p>\n",
            escape_html(&r.practices.join(", "))
        ));
    }
    if !r.certifications.is_empty() {
        out.push_str(&format!(
            "    <p><strong>Certificações:</strong> {}</p>\n",
            escape_html(&r.certifications.join(", "))
        ));
    }
    out.push_str("  </template>\n");
}

pub fn render_html(records: &[CardRecord], sectors: &[String]) -> Vec<u8> {
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\"/>\n");
    out.push_str("  <meta content=\"width=device-width, initial-scale=1.0\" name=\"viewport\"/>\n");
    out.push_str(&format!("  <title>{PAGE_TITLE}</title>\n"));
    out.push_str("  <style>\n");
    out.push_str(
        r#"    body { font-family: system-ui, sans-serif; margin: 0; background: #f4f7f4; color: #1c2b1c; }
    header { background: #1d5c2f; color: #fff; padding: 1rem 2rem; }
    .controls { display: flex; gap: 1rem; margin-top: 0.75rem; }
    .controls input, .controls select { padding: 0.5rem; border: none; border-radius: 4px; min-width: 14rem; }
    main { max-width: 72rem; margin: 0 auto; padding: 1.5rem; }
    #cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(16rem, 1fr)); gap: 1rem; }
    .card { background: #fff; border-radius: 8px; padding: 1rem; cursor: pointer; box-shadow: 0 1px 3px rgba(0,0,0,0.15); }
    .card:focus { outline: 2px solid #1d5c2f; }
    .card-logo { max-width: 100%; height: 4rem; object-fit: contain; }
    .badge-fallback { display: flex; flex-direction: column; align-items: center; justify-content: center; height: 4rem; background: #1d5c2f; color: #fff; font-weight: 700; border-radius: 4px; }
    .card-sector { color: #1d5c2f; font-size: 0.85rem; }
    #no-results { text-align: center; color: #666; padding: 2rem 0; }
    .modal { position: fixed; inset: 0; background: rgba(0,0,0,0.5); display: flex; align-items: center; justify-content: center; }
    .modal[aria-hidden="true"] { display: none; }
    .modal-content { background: #fff; border-radius: 8px; max-width: 36rem; width: 90%; max-height: 80vh; overflow-y: auto; padding: 1.5rem; position: relative; }
    .modal-close { position: absolute; top: 0.5rem; right: 0.75rem; border: none; background: none; font-size: 1.5rem; cursor: pointer; }
    .detail-short { font-style: italic; }
"#,
    );
    out.push_str("  </style>\n</head>\n<body>\n");

    out.push_str("  <header>\n");
    out.push_str(&format!("    <h1>{PAGE_TITLE}</h1>\n"));
    out.push_str("    <div class=\"controls\">\n");
    out.push_str(
        "      <input id=\"search\" type=\"search\" placeholder=\"Buscar fornecedores...\" aria-label=\"Buscar fornecedores\"/>\n",
    );
    out.push_str("      <select id=\"sector\" aria-label=\"Filtrar por setor\">\n");
    out.push_str("        <option value=\"\">Todos os setores</option>\n");
    for sector in sectors {
        let escaped = escape_html(sector);
        out.push_str(&format!(
            "        <option value=\"{escaped}\">{escaped}</option>\n"
        ));
    }
    out.push_str("      </select>\n    </div>\n  </header>\n");

    out.push_str("  <main>\n");
    if records.is_empty() {
        out.push_str(&format!("  <p id=\"no-results\">{NO_RESULTS_MESSAGE}</p>\n"));
    } else {
        out.push_str(&format!(
            "  <p id=\"no-results\" hidden>{NO_RESULTS_MESSAGE}</p>\n"
        ));
    }
    out.push_str("  <section id=\"cards\">\n");
    for (index, record) in records.iter().enumerate() {
        render_card(&mut out, index, record);
    }
    out.push_str("  </section>\n  </main>\n");

    for (index, record) in records.iter().enumerate() {
        render_detail_template(&mut out, index, record);
    }

    out.push_str(
        r#"  <div id="modal" class="modal" role="dialog" aria-modal="true" aria-hidden="true" aria-labelledby="modal-title">
    <div class="modal-content" role="document">
      <button id="modal-close" class="modal-close" type="button" aria-label="Fechar">&times;</button>
      <h2 id="modal-title"></h2>
      <div id="modal-body"></div>
    </div>
  </div>
"#,
    );

    out.push_str(
        r#"  <script>
    (function() {
      document.querySelectorAll('img[data-candidates]').forEach(function(img) {
        var candidates = JSON.parse(img.getAttribute('data-candidates'));
        var i = 0;
        img.addEventListener('error', function() {
          i += 1;
          if (i < candidates.length) {
            img.src = candidates[i];
          } else {
            var fallback = img.nextElementSibling;
            img.remove();
            if (fallback) fallback.hidden = false;
          }
        });
        img.src = candidates[0];
      });

      var searchInput = document.getElementById('search');
      var sectorSelect = document.getElementById('sector');
      var noResults = document.getElementById('no-results');
      var cards = Array.prototype.slice.call(document.querySelectorAll('.card'));

      function applyFilters() {
        var sector = sectorSelect.value.toLowerCase();
        var query = searchInput.value.trim().toLowerCase();
        var visible = 0;
        cards.forEach(function(card) {
          var matches = true;
          if (sector && card.getAttribute('data-sector').toLowerCase() !== sector) matches = false;
          if (matches && query && card.getAttribute('data-haystack').indexOf(query) === -1) matches = false;
          card.hidden = !matches;
          if (matches) visible += 1;
        });
        noResults.hidden = visible !== 0;
      }

      searchInput.addEventListener('input', function() { applyFilters(); });
      searchInput.addEventListener('keydown', function(ev) {
        if (ev.key === 'Enter') applyFilters();
      });
      sectorSelect.addEventListener('change', function() { applyFilters(); });

      var modal = document.getElementById('modal');
      var modalTitle = document.getElementById('modal-title');
      var modalBody = document.getElementById('modal-body');
      var modalClose = document.getElementById('modal-close');

      function openModal(card) {
        var template = document.getElementById('detail-' + card.getAttribute('data-index'));
        if (!template) return;
        modalTitle.textContent = card.getAttribute('data-name');
        modalBody.innerHTML = template.innerHTML;
        modal.setAttribute('aria-hidden', 'false');
        modalClose.focus();
      }

      function closeModal() {
        modal.setAttribute('aria-hidden', 'true');
      }

      cards.forEach(function(card) {
        card.addEventListener('click', function() { openModal(card); });
        card.addEventListener('keydown', function(ev) {
          if (ev.key === 'Enter') openModal(card);
        });
      });

      modalClose.addEventListener('click', closeModal);
      modal.addEventListener('click', function(ev) {
        if (ev.target === modal) closeModal();
      });
      document.addEventListener('keydown', function(ev) {
        if (ev.key === 'Escape') closeModal();
      });
    })();
  </script>
</body>
</html>
"#,
    );

    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::BadgeState;
    use crate::model::Company;
    use crate::output::build_cards;

    fn page_for(companies: &[Company], sectors: &[String]) -> String {
        let view: Vec<&Company> = companies.iter().collect();
        let badges: Vec<BadgeState> = view.iter().map(|c| crate::badge::initial_state(c)).collect();
        let records = build_cards(&view, &badges);
        String::from_utf8(render_html(&records, sectors)).unwrap()
    }

    #[test]
    fn modal_starts_hidden_and_labelled_by_title() {
        let page = page_for(&[], &[]);
        assert!(page.contains(r#"aria-hidden="true""#));
        assert!(page.contains(r#"aria-labelledby="modal-title""#));
    }

    #[test]
    fn interpolated_text_is_escaped() {
        let company = Company {
            name: "Eco <script>alert(1)</script> & \"Cia\"".to_string(),
            description: Some("a<b".to_string()),
            ..Company::default()
        };
        let page = page_for(&[company], &[]);
        assert!(page.contains("Eco &lt;script&gt;alert(1)&lt;/script&gt; &amp; &quot;Cia&quot;"));
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("a&lt;b"));
    }

    #[test]
    fn website_link_is_percent_encoded() {
        let company = Company {
            name: "EcoCorp".to_string(),
            website: Some("https://eco.example/página verde".to_string()),
            ..Company::default()
        };
        let page = page_for(&[company], &[]);
        assert!(page.contains(r#"href="https://eco.example/p%C3%A1gina%20verde""#));
    }

    #[test]
    fn empty_directory_shows_no_results_indicator() {
        let page = page_for(&[], &[]);
        assert!(page.contains(&format!("<p id=\"no-results\">{NO_RESULTS_MESSAGE}</p>")));
    }

    #[test]
    fn sector_options_render_after_the_all_entry() {
        let page = page_for(&[], &["Energia".to_string(), "Reciclagem".to_string()]);
        let all = page.find("Todos os setores").unwrap();
        let energia = page.find(r#"<option value="Energia">"#).unwrap();
        assert!(all < energia);
    }

    #[test]
    fn exhausted_badge_renders_the_textual_fallback() {
        let company = Company {
            name: "SemLogo".to_string(),
            ..Company::default()
        };
        let page = page_for(&[company], &[]);
        assert!(page.contains("<span>SELO</span><span>VERDE</span>"));
    }
}
