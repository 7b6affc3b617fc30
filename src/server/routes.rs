use crate::data::catalog::Catalog;
use crate::server::api;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    /// Download file name, sent as `Content-Disposition: attachment`.
    pub attachment: Option<String>,
    pub body: String,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            attachment: None,
            body,
        }
    }

    pub fn to_http_string(&self) -> String {
        let disposition = self
            .attachment
            .as_ref()
            .map(|name| {
                format!(
                    "Content-Disposition: attachment; filename=\"{}\"\r\n",
                    name.replace('"', "")
                )
            })
            .unwrap_or_default();
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            disposition,
            self.body
        )
    }
}

pub fn route_request(catalog: &Catalog, method: &str, path: &str, body: &str) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    match (method, path) {
        ("GET", "/") | ("GET", "/index.html") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            attachment: None,
            body: index_html(),
        },
        ("GET", "/api/health") => json_result(api::health_payload(catalog)),
        ("GET", "/api/products") => json_result(api::product_ids_payload(catalog)),
        ("GET", "/api/new-product") => json_result(api::new_product_payload()),
        ("GET", "/api/thematic-areas") => json_result(api::thematic_areas_payload()),
        ("GET", "/api/fields") => json_result(api::fields_payload()),
        ("POST", "/api/products/import") => json_result(api::import_payload(body)),
        ("POST", "/api/products/refresh") => json_result(api::refresh_payload(body)),
        ("POST", "/api/products/preview") => json_result(api::preview_payload(body)),
        ("POST", "/api/products/export") => match api::export_payload(body) {
            Ok(export) => HttpResponse {
                attachment: Some(export.filename),
                ..HttpResponse::json(export.body)
            },
            Err(err) => api_error_response(&err),
        },
        (method, path) if method == "GET" && path.starts_with("/api/products/") => {
            let id = percent_decode(path.trim_start_matches("/api/products/"));
            json_result(api::product_payload(catalog, &id))
        }
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn json_result(result: Result<String, api::ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(err) => api_error_response(&err),
    }
}

fn api_error_response(err: &api::ApiError) -> HttpResponse {
    let (status_code, status_text) = err.status();
    if status_code >= 500 {
        tracing::error!("{err}");
    } else {
        tracing::debug!(status_code, "{err}");
    }
    let fallback = format!(
        "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
        serde_json::to_string(&err.to_string()).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        attachment: None,
        body: serde_json::to_string_pretty(&err.to_response_body()).unwrap_or(fallback),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        attachment: None,
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

/// Decode `%XX` escapes in a path segment; malformed escapes pass through unchanged.
fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' && index + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[index + 1..index + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                decoded.push(value);
                index += 3;
                continue;
            }
        }
        decoded.push(bytes[index]);
        index += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Swarm Product Metadata Editor</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 16px; display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 12px; margin-bottom: 12px; }
    .loader { background: #ffe0b2; } .editor { background: #e3f2fd; } .viewer { background: #e8f5e9; }
    label { display: block; margin: 8px 0 4px; font-weight: 600; }
    input, textarea, select { width: 100%; box-sizing: border-box; padding: 6px; }
    textarea { min-height: 120px; font-family: monospace; }
    button { margin-top: 8px; padding: 6px 12px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; max-height: 600px; }
    #diagnostics li.error { color: #b00020; } #diagnostics li.warning { color: #8a6d00; }
  </style>
</head>
<body>
  <div>
    <div class="card loader">
      <strong>Load from existing records</strong>
      <input id="product-selector" list="product-ids" placeholder="Start typing SW-MAG..." />
      <datalist id="product-ids"></datalist>
      <button id="load-btn">Load</button>
      <button id="new-btn">New</button>
    </div>
    <div class="card loader">
      <strong>Load from local file</strong>
      <input id="file-input" type="file" accept=".json,application/json" />
      <button id="upload-btn">Load</button>
    </div>
    <div class="card editor">
      <strong>Edit properties</strong>
      <form id="editor"></form>
    </div>
  </div>
  <div class="card viewer">
    <strong>Check display preview and download output json</strong>
    <div><button id="refresh-btn">Refresh!</button> <button id="export-btn">Download JSON</button></div>
    <ul id="diagnostics"></ul>
    <label>Output preview</label>
    <div id="html-preview"></div>
    <label>JSON</label>
    <pre id="json-view">{}</pre>
  </div>

  <script>
    const form = document.getElementById('editor');
    const jsonView = document.getElementById('json-view');
    const htmlPreview = document.getElementById('html-preview');
    const diagnosticsEl = document.getElementById('diagnostics');
    let bindings = [];
    let product = {};

    async function api(path, options) {
      const response = await fetch(path, options);
      const payload = await response.json();
      if (!response.ok) {
        const extra = payload.unknown_fields ? ' (' + payload.unknown_fields.join(', ') + ')' : '';
        throw new Error(payload.message + extra);
      }
      return payload;
    }

    function post(path, body) {
      return api(path, { method: 'POST', headers: { 'Content-Type': 'application/json' }, body });
    }

    function buildForm(areas) {
      form.innerHTML = '';
      for (const binding of bindings) {
        const label = document.createElement('label');
        label.textContent = binding.name + ':';
        let input;
        if (binding.widget === 'multi_choice') {
          input = document.createElement('select');
          input.multiple = true;
          for (const area of areas) {
            const option = document.createElement('option');
            option.value = area; option.textContent = area;
            input.appendChild(option);
          }
        } else if (binding.widget === 'text_input') {
          input = document.createElement('input');
          input.placeholder = binding.name;
        } else {
          input = document.createElement('textarea');
          if (binding.widget === 'list') input.placeholder = 'one entry per line';
        }
        input.id = 'field-' + binding.name;
        form.appendChild(label);
        form.appendChild(input);
      }
    }

    function fillForm() {
      for (const binding of bindings) {
        const input = document.getElementById('field-' + binding.name);
        const value = product[binding.name];
        if (binding.widget === 'multi_choice') {
          for (const option of input.options) option.selected = (value || []).includes(option.value);
        } else if (binding.widget === 'list') {
          input.value = (value || []).join('\n');
        } else {
          input.value = value || '';
        }
      }
    }

    function readForm() {
      const fields = {};
      for (const binding of bindings) {
        const input = document.getElementById('field-' + binding.name);
        if (binding.widget === 'multi_choice') {
          fields[binding.name] = Array.from(input.selectedOptions).map(o => o.value);
        } else if (binding.widget === 'list') {
          fields[binding.name] = input.value.split('\n').map(s => s.trim()).filter(Boolean);
        } else {
          fields[binding.name] = input.value;
        }
      }
      return fields;
    }

    function showPreview(preview) {
      product = preview.product;
      jsonView.textContent = JSON.stringify(product, null, 2);
      htmlPreview.innerHTML = preview.html;
      diagnosticsEl.innerHTML = '';
      for (const diag of preview.diagnostics) {
        const li = document.createElement('li');
        li.className = diag.severity;
        li.textContent = diag.context + ': ' + diag.message;
        diagnosticsEl.appendChild(li);
      }
    }

    async function setProduct(next) {
      product = next;
      fillForm();
      await refresh();
    }

    async function refresh() {
      try {
        showPreview(await post('/api/products/refresh', JSON.stringify({ product, fields: readForm() })));
      } catch (err) { alert(err.message); }
    }

    document.getElementById('load-btn').addEventListener('click', async () => {
      const id = document.getElementById('product-selector').value.trim();
      try { await setProduct(await api('/api/products/' + encodeURIComponent(id))); }
      catch (err) { alert(err.message); }
    });
    document.getElementById('new-btn').addEventListener('click', async () => {
      await setProduct(await api('/api/new-product'));
    });
    document.getElementById('upload-btn').addEventListener('click', async () => {
      const file = document.getElementById('file-input').files[0];
      if (!file) return;
      try { await setProduct(await post('/api/products/import', await file.text())); }
      catch (err) { alert(err.message); }
    });
    document.getElementById('refresh-btn').addEventListener('click', refresh);
    document.getElementById('export-btn').addEventListener('click', async () => {
      await refresh();
      const response = await fetch('/api/products/export', { method: 'POST', body: JSON.stringify(product) });
      const blob = await response.blob();
      const link = document.createElement('a');
      link.href = URL.createObjectURL(blob);
      link.download = (product.product_id || 'product') + '.json';
      link.click();
      URL.revokeObjectURL(link.href);
    });

    (async () => {
      const [ids, areas, fields] = await Promise.all([
        api('/api/products'), api('/api/thematic-areas'), api('/api/fields'),
      ]);
      const datalist = document.getElementById('product-ids');
      for (const id of ids.product_ids) {
        const option = document.createElement('option');
        option.value = id;
        datalist.appendChild(option);
      }
      bindings = fields.fields;
      buildForm(areas.thematic_areas);
      await setProduct(await api('/api/new-product'));
    })();
  </script>
</body>
</html>
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_decode_handles_escapes() {
        assert_eq!(percent_decode("SW-MAGx_LR_1B"), "SW-MAGx_LR_1B");
        assert_eq!(percent_decode("SW%2DA%20B"), "SW-A B");
        assert_eq!(percent_decode("bad%zz"), "bad%zz");
        assert_eq!(percent_decode("trail%4"), "trail%4");
    }

    #[test]
    fn attachment_header_is_emitted() {
        let response = HttpResponse {
            attachment: Some("SW-A.json".to_string()),
            ..HttpResponse::json("{}".to_string())
        };
        let raw = response.to_http_string();
        assert!(raw.contains("Content-Disposition: attachment; filename=\"SW-A.json\"\r\n"));
        assert!(raw.ends_with("\r\n\r\n{}"));
    }
}
