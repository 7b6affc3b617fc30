//! Markdown and HTML previews of a record, recomputed from current field values on each call.

use pulldown_cmark::{html, Options, Parser};

use crate::data::product::Product;

impl Product {
    /// Bulleted "Files:" / "Web services:" block. Empty when no link is set.
    pub fn markdown_links(&self) -> String {
        let mut block = String::new();
        if !self.link_files_http.is_empty() || !self.link_files_ftp.is_empty() {
            block.push_str("- Files:\n");
            if !self.link_files_http.is_empty() {
                block.push_str(&format!("\t- <{}>\n", self.link_files_http));
            }
            if !self.link_files_ftp.is_empty() {
                block.push_str(&format!("\t- {}\n", self.link_files_ftp));
            }
        }

        let services = [
            ("VirES GUI", &self.link_vires_gui),
            ("Notebook", &self.link_notebook),
            ("HAPI", &self.link_hapi),
        ];
        if services.iter().any(|(_, link)| !link.is_empty()) {
            block.push_str("- Web services:\n");
            for (label, link) in services.iter().filter(|(_, link)| !link.is_empty()) {
                block.push_str(&format!("\t- [{label}]({link})\n"));
            }
        }

        block.truncate(block.trim_end().len());
        block
    }

    pub fn markdown_preview(&self) -> String {
        [
            format!(
                "# {}\n\n{}\n\nThematic areas: {}",
                self.product_id,
                self.name,
                self.thematic_areas.join(",")
            ),
            format!("## Description\n\n{}", self.description),
            format!("## Data access\n\n{}", self.markdown_links()),
            format!("## File contents\n\n{}", self.tabulate_variables()),
            format!("## More details\n\n{}", self.details),
        ]
        .join("\n\n")
    }

    /// [Product::markdown_preview] rendered as CommonMark with pipe tables enabled.
    pub fn html_preview(&self) -> String {
        let markdown = self.markdown_preview();
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        let parser = Parser::new_ext(&markdown, options);
        let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut rendered, parser);
        rendered
    }
}
