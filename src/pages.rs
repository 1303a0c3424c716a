// 🖥️ HTML pages for the web UI
//
// Plain string building; every user-controlled value goes through `escape`.

use std::fmt::Write;

use crate::bank::{Bank, FACE_VALUES};
use crate::dates::format_date;
use crate::ledger::Overview;

const STYLE: &str = "body{font-family:sans-serif;margin:2em;}\
table{border-collapse:collapse;margin:1em 0;}\
td,th{border:1px solid #ccc;padding:4px 8px;}\
.error{color:#b00;font-weight:bold;}\
form.inline{display:inline;}";

pub fn escape(s: &str) -> String {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"zh-Hant\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape(title),
    )
}

fn error_block(error: Option<&str>) -> String {
    match error {
        Some(msg) => format!("<p class=\"error\">{}</p>\n", escape(msg)),
        None => String::new(),
    }
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        "<option value=\"{}\"{}>{}</option>",
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    )
}

// ============================================================================
// MAIN PAGE
// ============================================================================

pub fn render_index(view: &Overview) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>抽獎記錄</h1>");
    let _ = writeln!(body, "<p><a href=\"/manage_users\">管理用戶</a></p>");
    body.push_str(&error_block(view.error.as_deref()));

    render_entry_form(&mut body, view);
    render_summary(&mut body, view);
    render_history(&mut body, view);

    layout("抽獎記錄", &body)
}

fn render_entry_form(body: &mut String, view: &Overview) {
    let person = view.person.as_deref().unwrap_or("");

    // Switching person reloads the page so the bank list reflects that person
    let _ = writeln!(body, "<h2>新增記錄</h2>");
    let _ = writeln!(body, "<form method=\"get\" action=\"/\">");
    let _ = write!(body, "<label>用戶 <select name=\"person\" onchange=\"this.form.submit()\">");
    for user in &view.users {
        body.push_str(&option(user, user, user == person));
    }
    let _ = writeln!(body, "</select></label>\n</form>");

    let action = format!("/?person={}", escape(&urlencoding::encode(person)));
    let _ = writeln!(body, "<form method=\"post\" action=\"{action}\">");
    let _ = writeln!(body, "<input type=\"hidden\" name=\"person\" value=\"{}\">", escape(person));
    let _ = writeln!(
        body,
        "<label>日期 <input type=\"date\" name=\"date\" value=\"{}\"></label>",
        format_date(view.today)
    );

    if view.available_banks.is_empty() {
        let _ = writeln!(body, "<p>{} 已使用所有銀行</p>", escape(person));
    } else {
        let _ = write!(body, "<label>銀行 <select name=\"bank\">");
        for bank in &view.available_banks {
            body.push_str(&option(bank.as_str(), bank.as_str(), false));
        }
        let _ = writeln!(body, "</select></label>");
    }

    for field in ["value1", "value2", "value3"] {
        let _ = write!(body, "<select name=\"{field}\">");
        for value in FACE_VALUES {
            let v = value.to_string();
            body.push_str(&option(&v, &v, false));
        }
        let _ = writeln!(body, "</select>");
    }
    let _ = writeln!(body, "<button type=\"submit\">提交</button>\n</form>");
}

fn render_summary(body: &mut String, view: &Overview) {
    let heading = match view.range {
        Some(range) => format!("匯總 {} 至 {}", format_date(range.start), format_date(range.end)),
        None => "匯總 (全部數據)".to_string(),
    };
    let _ = writeln!(body, "<h2>{}</h2>", escape(&heading));
    let _ = writeln!(
        body,
        "<p>本週：{} 至 {}</p>",
        format_date(view.week.start),
        format_date(view.week.end)
    );

    let summary_user = view.summary_user.as_deref().unwrap_or("");
    let _ = writeln!(body, "<form method=\"get\" action=\"/\">");
    if let Some(person) = &view.person {
        let _ = writeln!(body, "<input type=\"hidden\" name=\"person\" value=\"{}\">", escape(person));
    }
    let _ = write!(body, "<select name=\"selected_user_summary\">");
    for user in &view.users {
        body.push_str(&option(user, user, user == summary_user));
    }
    let _ = writeln!(body, "</select>");
    let _ = writeln!(
        body,
        "<input type=\"date\" name=\"start_date\" value=\"{}\">\n<input type=\"date\" name=\"end_date\" value=\"{}\">",
        escape(view.start_date.as_deref().unwrap_or("")),
        escape(view.end_date.as_deref().unwrap_or(""))
    );
    let _ = writeln!(body, "<button type=\"submit\">查詢</button>\n</form>");

    let _ = writeln!(body, "<table>\n<tr><th>銀行</th><th>次數</th><th>總面值</th></tr>");
    for (bank, totals) in view.summary.iter() {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            bank, totals.count, totals.total_value
        );
    }
    let total = view.summary.grand_total();
    let _ = writeln!(
        body,
        "<tr><th>合計</th><th>{}</th><th>{}</th></tr>\n</table>",
        total.count, total.total_value
    );
}

fn render_history(body: &mut String, view: &Overview) {
    let selected = view.selected_bank.as_deref().unwrap_or("");

    let _ = writeln!(body, "<h2>歷史記錄</h2>");
    let _ = write!(body, "<form method=\"get\" action=\"/\"><select name=\"selected_bank\">");
    body.push_str(&option("", "全部", selected.is_empty()));
    for bank in Bank::ALL {
        body.push_str(&option(bank.as_str(), bank.as_str(), bank.as_str() == selected));
    }
    let _ = writeln!(body, "</select><button type=\"submit\">篩選</button></form>");

    let _ = writeln!(
        body,
        "<table>\n<tr><th>日期</th><th>用戶</th><th>銀行</th><th>面值</th><th></th></tr>"
    );
    for (index, entry) in &view.history {
        let values: Vec<String> = entry.entries.iter().map(|e| e.value.to_string()).collect();
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><form class=\"inline\" method=\"post\" action=\"/delete/{index}\">\
             <button type=\"submit\">刪除</button></form></td></tr>",
            format_date(entry.date),
            escape(entry.person.as_deref().unwrap_or("")),
            escape(entry.bank_name()),
            values.join(", "),
        );
    }
    let _ = writeln!(body, "</table>");
}

// ============================================================================
// USER MANAGEMENT
// ============================================================================

pub fn render_users(users: &[String], error: Option<&str>) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>管理用戶</h1>\n<p><a href=\"/\">返回</a></p>");
    body.push_str(&error_block(error));

    let _ = writeln!(body, "<ul>");
    for user in users {
        let _ = writeln!(
            body,
            "<li>{name} <form class=\"inline\" method=\"post\" action=\"/manage_users\">\
             <input type=\"hidden\" name=\"action\" value=\"delete\">\
             <input type=\"hidden\" name=\"user_to_delete\" value=\"{name}\">\
             <button type=\"submit\">刪除</button></form></li>",
            name = escape(user)
        );
    }
    let _ = writeln!(body, "</ul>");

    let _ = writeln!(
        body,
        "<form method=\"post\" action=\"/manage_users\">\
         <input type=\"hidden\" name=\"action\" value=\"add\">\
         <input type=\"text\" name=\"new_user\">\
         <button type=\"submit\">新增</button></form>"
    );

    layout("管理用戶", &body)
}
