//! HTML pages around the chart images: navigation, interface picker and the
//! live feed script.

use std::fmt::Write;

use url::form_urlencoded;

use crate::chart::ChartKind;
use crate::registry::InterfaceSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Summary,
    Top,
    Years,
    Months,
    Days,
    Hours,
    Five,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Summary,
        Page::Top,
        Page::Years,
        Page::Months,
        Page::Days,
        Page::Hours,
        Page::Five,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Page::Summary => "summary",
            Page::Top => "top",
            Page::Years => "years",
            Page::Months => "months",
            Page::Days => "days",
            Page::Hours => "hours",
            Page::Five => "five",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Summary => "Summary",
            Page::Top => "Top",
            Page::Years => "Years",
            Page::Months => "Months",
            Page::Days => "Days",
            Page::Hours => "Hours",
            Page::Five => "Five Minutes",
        }
    }

    pub fn charts(self) -> &'static [ChartKind] {
        match self {
            Page::Summary => &[ChartKind::VerticalSummary],
            Page::Top => &[ChartKind::Top],
            Page::Years => &[ChartKind::Yearly],
            Page::Months => &[ChartKind::Monthly],
            Page::Days => &[ChartKind::Daily],
            Page::Hours => &[ChartKind::Hourly, ChartKind::HourlyGraph],
            Page::Five => &[ChartKind::FiveMinute, ChartKind::FiveMinuteGraph],
        }
    }
}

const STYLE: &str = r#"<style>
body, input, select {
  color: #222;
  background: #fff;
  font: 100% system-ui;
}

a {
  color: #0033cc;
}

@media (prefers-color-scheme: dark) {
  body, input, select {
    color: #eee;
    background: #121212;
  }

  a {
    color: #809fff;
  }
}

.nav {
  display: inline-block;
  margin-right: 42px;
}

.content {
  display: inline-block;
  vertical-align: top;
}

.content img {
  margin-top: 16px;
  display: block;
}

#live {
  font-family: Courier, monospace;
}
</style>"#;

const SCRIPT: &str = r#"<script>
(function connect() {
  const scheme = location.protocol === "https:" ? "wss://" : "ws://";
  const socket = new WebSocket(scheme + location.host + "/live" + location.search);
  socket.addEventListener("open", function () {
    socket.send("Hello!");
  });
  socket.addEventListener("message", function (event) {
    document.getElementById("live").innerText = event.data;
  });
  socket.addEventListener("close", function (event) {
    console.log("Socket is closed. Reconnect will be attempted in 10 second.", event.reason);
    document.getElementById("live").innerText = "";
    setTimeout(connect, 10000);
  });
})();
</script>"#;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Query string pairs for links, `iface=` first when an interface is selected.
fn query(selected: &InterfaceSelection, extra: &[(&str, &str)]) -> String {
    let mut ser = form_urlencoded::Serializer::new(String::new());
    if let Some(name) = selected.name() {
        ser.append_pair("iface", name.as_str());
    }
    for (k, v) in extra {
        ser.append_pair(k, v);
    }
    let q = ser.finish();
    if q.is_empty() {
        q
    } else {
        format!("?{q}")
    }
}

fn nav(out: &mut String, selected: &InterfaceSelection, interfaces: &[String]) {
    out.push_str("<ul class=\"nav\">");
    out.push_str(
        "<select onchange=\"location.replace(location.pathname+'?iface='+encodeURIComponent(this.value))\" style=\"width: 120px\">",
    );
    out.push_str("<option value=\"\">default interface</option>");
    let current = selected.name().map(|n| n.as_str());
    for iface in interfaces {
        let name = escape_html(iface);
        if Some(iface.as_str()) == current {
            let _ = write!(out, "<option selected>{name}</option>");
        } else {
            let _ = write!(out, "<option>{name}</option>");
        }
    }
    out.push_str("</select>");

    let q = escape_html(&query(selected, &[]));
    for page in Page::ALL {
        let _ = write!(
            out,
            "<li><a href=\"{}{q}\">{}</a></li>",
            page.path(),
            page.title()
        );
    }
    out.push_str("</ul>");
}

fn picture(out: &mut String, kind: ChartKind, selected: &InterfaceSelection) {
    let stem = kind.stem();
    let dark = escape_html(&query(selected, &[("dark", "1")]));
    let light = escape_html(&query(selected, &[("dark", "0")]));
    let plain = escape_html(&query(selected, &[]));
    let _ = write!(
        out,
        "<picture>\
         <source srcset=\"{stem}.png{dark}\" media=\"(prefers-color-scheme: dark)\">\
         <source srcset=\"{stem}.png{light}\">\
         <img class=\"light\" src=\"{stem}.png{plain}\" alt=\"{stem}.png\">\
         </picture>"
    );
}

/// Full HTML document for `page`.
pub fn render_page(page: Page, selected: &InterfaceSelection, interfaces: &[String]) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<!DOCTYPE html><html><head>");
    let _ = write!(out, "<title>vnStat - {}</title>", page.title());
    out.push_str(STYLE);
    out.push_str("</head><body>");
    nav(&mut out, selected, interfaces);
    out.push_str("<div class=\"content\"><div id=\"live\"></div>");
    for kind in page.charts() {
        picture(&mut out, *kind, selected);
    }
    out.push_str("</div>");
    out.push_str(SCRIPT);
    out.push_str("</body></html>");
    out
}
