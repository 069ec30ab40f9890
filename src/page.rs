use std::rc::Rc;

use crate::capabilities::Capabilities;
use crate::dom::{Dom, NodeId};
use crate::events::{EventState, Listener, ListenerStore};
use crate::html::parse_html;
use crate::{Error, Result};

const DEFAULT_URL: &str = "https://service.example.gov.uk/start";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintTransition {
    Enter,
    Leave,
}

impl PrintTransition {
    fn label(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    Assign,
    Replace,
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub kind: NavigationKind,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
struct HistoryState {
    entries: Vec<String>,
    index: usize,
    navigations: Vec<Navigation>,
}

impl HistoryState {
    fn new(url: &str) -> Self {
        Self {
            entries: vec![url.to_string()],
            index: 0,
            navigations: Vec::new(),
        }
    }

    fn current(&self) -> &str {
        &self.entries[self.index]
    }
}

type PrintHandlerFn = Rc<dyn Fn(&mut Page, PrintTransition) -> Result<()>>;

pub struct Page {
    dom: Dom,
    listeners: ListenerStore,
    print_handlers: Vec<PrintHandlerFn>,
    active_element: Option<NodeId>,
    scroll_y: i64,
    history: HistoryState,
    capabilities: Capabilities,
    trace: bool,
    trace_events: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("dom", &self.dom)
            .field("active_element", &self.active_element)
            .field("scroll_y", &self.scroll_y)
            .field("history", &self.history)
            .field("capabilities", &self.capabilities)
            .field("print_handlers", &self.print_handlers.len())
            .field("trace", &self.trace)
            .field("trace_events", &self.trace_events)
            .field("trace_logs", &self.trace_logs)
            .field("trace_log_limit", &self.trace_log_limit)
            .field("trace_to_stderr", &self.trace_to_stderr)
            .finish()
    }
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_url(DEFAULT_URL, html)
    }

    pub fn from_html_with_url(url: &str, html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            print_handlers: Vec::new(),
            active_element: None,
            scroll_y: 0,
            history: HistoryState::new(url),
            capabilities: Capabilities::default(),
            trace: false,
            trace_events: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::DomRuntime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn url(&self) -> &str {
        self.history.current()
    }

    pub fn history_len(&self) -> usize {
        self.history.entries.len()
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.history.navigations
    }

    pub fn scroll_y(&self) -> i64 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, y: i64) {
        self.scroll_y = y.max(0);
    }

    pub fn active_element_id(&self) -> Option<String> {
        self.active_element.and_then(|node| self.dom.attr(node, "id"))
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.focus_node(target)
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.blur_node(target)
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        if self.dom.readonly(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();

        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    pub fn press_key(&mut self, selector: &str, key: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        self.focus_node(target)?;
        let event = self.dispatch_event_state(EventState::keyboard(target, key))?;
        if event.default_prevented {
            return Ok(());
        }
        self.run_keydown_default(target, key)
    }

    pub fn wheel(&mut self, selector: &str, delta_y: i64) -> Result<()> {
        let target = self.select_one(selector)?;
        let event = self.dispatch_event_state(EventState::wheel(target, delta_y))?;
        if event.default_prevented {
            return Ok(());
        }
        self.run_wheel_default(target, event.delta_y)
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event)?;
        Ok(())
    }

    pub fn begin_print(&mut self) -> Result<()> {
        if self.capabilities.match_media {
            self.emit_print_transition(PrintTransition::Enter, "media-query")?;
        }
        self.emit_print_transition(PrintTransition::Enter, "window-beforeprint")
    }

    pub fn end_print(&mut self) -> Result<()> {
        if self.capabilities.match_media {
            self.emit_print_transition(PrintTransition::Leave, "media-query")?;
        }
        self.emit_print_transition(PrintTransition::Leave, "window-afterprint")
    }

    pub fn print(&mut self) -> Result<()> {
        self.begin_print()?;
        self.end_print()
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.class_contains(target, class_name)
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual.trim() != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.trim().to_string(),
                dom_snippet: truncate_chars(&self.dom.dump_node(target), 200),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: truncate_chars(&self.dom.dump_node(target), 200),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector)?;
        Ok(())
    }

    pub(crate) fn dom(&self) -> &Dom {
        &self.dom
    }

    pub(crate) fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub(crate) fn active_node(&self) -> Option<NodeId> {
        self.active_element
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub(crate) fn add_listener<F>(&mut self, node: NodeId, event: &str, capture: bool, handler: F)
    where
        F: Fn(&mut Page, &mut EventState) -> Result<()> + 'static,
    {
        self.listeners.add(
            node,
            event.to_string(),
            Listener {
                capture,
                handler: Rc::new(handler),
            },
        );
    }

    pub(crate) fn on_print_transition<F>(&mut self, handler: F)
    where
        F: Fn(&mut Page, PrintTransition) -> Result<()> + 'static,
    {
        self.print_handlers.push(Rc::new(handler));
    }

    fn emit_print_transition(&mut self, transition: PrintTransition, source: &str) -> Result<()> {
        self.trace_event_line(format!(
            "[print] transition={} source={source}",
            transition.label()
        ));
        let handlers = self.print_handlers.clone();
        for handler in handlers {
            handler(self, transition)?;
        }
        Ok(())
    }

    pub(crate) fn replace_state(&mut self, url: &str) {
        let from = self.history.current().to_string();
        self.history.entries[self.history.index] = url.to_string();
        self.history.navigations.push(Navigation {
            kind: NavigationKind::Replace,
            from,
            to: url.to_string(),
        });
    }

    pub(crate) fn history_back(&mut self) -> Result<()> {
        if self.history.index == 0 {
            return Ok(());
        }
        let from = self.history.current().to_string();
        self.history.index -= 1;
        let to = self.history.current().to_string();
        self.history.navigations.push(Navigation {
            kind: NavigationKind::Back,
            from,
            to,
        });
        Ok(())
    }

    fn navigate_assign(&mut self, to: &str) {
        let from = self.history.current().to_string();
        self.history.entries.truncate(self.history.index + 1);
        self.history.entries.push(to.to_string());
        self.history.index += 1;
        self.history.navigations.push(Navigation {
            kind: NavigationKind::Assign,
            from,
            to: to.to_string(),
        });
    }

    pub(crate) fn click_node(&mut self, target: NodeId) -> Result<()> {
        if self.dom.disabled(target) {
            return Ok(());
        }

        // Clicks move focus before activation.
        self.focus_node(target)?;

        let click_outcome = self.dispatch_event(target, "click")?;
        if click_outcome.default_prevented {
            return Ok(());
        }
        self.run_click_default(target)
    }

    fn run_click_default(&mut self, target: NodeId) -> Result<()> {
        if self.dom.is_tag(target, "summary") {
            if let Some(details) = self.dom.find_ancestor_by_tag(target, "details") {
                if self.dom.has_attr(details, "open")? {
                    self.dom.remove_attr(details, "open")?;
                } else {
                    self.dom.set_attr(details, "open", "open")?;
                }
                self.dispatch_event(details, "toggle")?;
            }
            return Ok(());
        }

        if is_checkbox_input(&self.dom, target) {
            let current = self.dom.checked(target)?;
            self.dom.set_checked(target, !current)?;
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
            return Ok(());
        }

        if is_radio_input(&self.dom, target) {
            let current = self.dom.checked(target)?;
            if !current {
                self.uncheck_other_radios_in_group(target)?;
                self.dom.set_checked(target, true)?;
                self.dispatch_event(target, "input")?;
                self.dispatch_event(target, "change")?;
            }
            return Ok(());
        }

        if is_submit_control(&self.dom, target) {
            if let Some(form) = self.dom.find_ancestor_by_tag(target, "form") {
                self.submit_form(form)?;
            }
            return Ok(());
        }

        if self.dom.is_tag(target, "a") {
            if let Some(href) = self.dom.attr(target, "href") {
                if !href.is_empty() {
                    self.navigate_assign(&href);
                }
            }
        }

        Ok(())
    }

    fn submit_form(&mut self, form: NodeId) -> Result<()> {
        let outcome = self.dispatch_event(form, "submit")?;
        if outcome.default_prevented {
            return Ok(());
        }
        let action = self
            .dom
            .attr(form, "action")
            .filter(|action| !action.is_empty())
            .unwrap_or_else(|| self.history.current().to_string());
        self.navigate_assign(&action);
        Ok(())
    }

    fn run_keydown_default(&mut self, target: NodeId, key: &str) -> Result<()> {
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();

        if tag == "input" && key == "Enter" {
            if let Some(form) = self.dom.find_ancestor_by_tag(target, "form") {
                return self.submit_form(form);
            }
            return Ok(());
        }

        if is_number_input(&self.dom, target) {
            match key {
                "ArrowUp" => return self.step_number_value(target, 1.0),
                "ArrowDown" => return self.step_number_value(target, -1.0),
                _ => {}
            }
        }

        if (tag == "input" || tag == "textarea")
            && !self.dom.readonly(target)
            && key.chars().count() == 1
        {
            let mut value = self.dom.value(target)?;
            value.push_str(key);
            self.dom.set_value(target, &value)?;
            self.dispatch_event(target, "input")?;
        }

        Ok(())
    }

    fn run_wheel_default(&mut self, target: NodeId, delta_y: i64) -> Result<()> {
        if self.active_element == Some(target) && is_number_input(&self.dom, target) {
            // Wheel up spins the value up.
            let step = if delta_y < 0 { 1.0 } else { -1.0 };
            return self.step_number_value(target, step);
        }
        self.scroll_y = (self.scroll_y + delta_y).max(0);
        Ok(())
    }

    fn step_number_value(&mut self, target: NodeId, delta: f64) -> Result<()> {
        if self.dom.readonly(target) {
            return Ok(());
        }
        let current = self.dom.value(target)?;
        let parsed = current.trim().parse::<f64>().unwrap_or(0.0);
        let mut next = parsed + delta;
        if let Some(min) = self
            .dom
            .attr(target, "min")
            .and_then(|min| min.parse::<f64>().ok())
        {
            if next < min {
                next = min;
            }
        }
        self.dom.set_value(target, &format_number(next))?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    fn uncheck_other_radios_in_group(&mut self, target: NodeId) -> Result<()> {
        let Some(name) = self.dom.attr(target, "name") else {
            return Ok(());
        };
        let scope = self
            .dom
            .find_ancestor_by_tag(target, "form")
            .unwrap_or(self.dom.root());

        let mut nodes = Vec::new();
        self.dom.collect_elements_dfs(scope, &mut nodes);
        for node in nodes {
            if node != target
                && is_radio_input(&self.dom, node)
                && self.dom.attr(node, "name").as_deref() == Some(name.as_str())
            {
                self.dom.set_checked(node, false)?;
            }
        }
        Ok(())
    }

    pub(crate) fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<EventState> {
        self.dispatch_event_state(EventState::new(event_type, target))
    }

    pub(crate) fn dispatch_event_state(&mut self, mut event: EventState) -> Result<EventState> {
        let mut path = Vec::new();
        let mut cursor = Some(event.target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }
        path.reverse();

        // Capture phase.
        if path.len() >= 2 {
            for node in &path[..path.len() - 1] {
                event.current_target = *node;
                self.invoke_listeners(*node, &mut event, true)?;
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return Ok(event);
                }
            }
        }

        // Target phase: capture listeners first.
        event.current_target = event.target;
        self.invoke_listeners(event.target, &mut event, true)?;
        if event.propagation_stopped {
            self.trace_event_done(&event, "propagation_stopped");
            return Ok(event);
        }

        // Target phase: bubble listeners.
        self.invoke_listeners(event.target, &mut event, false)?;
        if event.propagation_stopped {
            self.trace_event_done(&event, "propagation_stopped");
            return Ok(event);
        }

        // Bubble phase.
        if path.len() >= 2 {
            for node in path[..path.len() - 1].iter().rev() {
                event.current_target = *node;
                self.invoke_listeners(*node, &mut event, false)?;
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return Ok(event);
                }
            }
        }

        self.trace_event_done(&event, "completed");
        Ok(event)
    }

    pub(crate) fn focus_node(&mut self, node: NodeId) -> Result<()> {
        if self.dom.element(node).is_none()
            || !self.dom.is_connected(node)
            || self.dom.disabled(node)
        {
            return Ok(());
        }

        if self.active_element == Some(node) {
            return Ok(());
        }

        if let Some(current) = self.active_element {
            self.blur_node(current)?;
        }

        self.active_element = Some(node);
        self.dispatch_event(node, "focusin")?;
        self.dispatch_event(node, "focus")?;
        Ok(())
    }

    pub(crate) fn blur_node(&mut self, node: NodeId) -> Result<()> {
        if self.active_element != Some(node) {
            return Ok(());
        }

        self.dispatch_event(node, "focusout")?;
        self.dispatch_event(node, "blur")?;
        self.active_element = None;
        Ok(())
    }

    pub(crate) fn blur_active(&mut self) -> Result<()> {
        if let Some(current) = self.active_element {
            self.blur_node(current)?;
        }
        Ok(())
    }

    fn invoke_listeners(
        &mut self,
        node_id: NodeId,
        event: &mut EventState,
        capture: bool,
    ) -> Result<()> {
        let listeners = self.listeners.get(node_id, &event.event_type, capture);
        for listener in listeners {
            if self.trace {
                let phase = if capture { "capture" } else { "bubble" };
                let target_label = self.trace_node_label(event.target);
                let current_label = self.trace_node_label(event.current_target);
                self.trace_event_line(format!(
                    "[event] {} target={} current={} phase={} default_prevented={}",
                    event.event_type, target_label, current_label, phase, event.default_prevented
                ));
            }
            (listener.handler)(self, event)?;
            if event.immediate_propagation_stopped {
                break;
            }
        }
        Ok(())
    }

    fn trace_event_done(&mut self, event: &EventState, outcome: &str) {
        if !self.trace {
            return;
        }
        let target_label = self.trace_node_label(event.target);
        self.trace_event_line(format!(
            "[event] done {} target={} outcome={} default_prevented={} propagation_stopped={}",
            event.event_type,
            target_label,
            outcome,
            event.default_prevented,
            event.propagation_stopped
        ));
    }

    fn trace_node_label(&self, node: NodeId) -> String {
        match self.dom.tag_name(node) {
            Some(tag) => match self.dom.attr(node, "id") {
                Some(id) => format!("{tag}#{id}"),
                None => tag.to_string(),
            },
            None => format!("node-{}", node.0),
        }
    }

    fn trace_event_line(&mut self, line: String) {
        if !self.trace || !self.trace_events {
            return;
        }
        if self.trace_to_stderr {
            eprintln!("{line}");
        }
        self.trace_logs.push(line);
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
    }
}

fn is_checkbox_input(dom: &Dom, node: NodeId) -> bool {
    dom.is_tag(node, "input")
        && dom
            .attr(node, "type")
            .map(|kind| kind.eq_ignore_ascii_case("checkbox"))
            .unwrap_or(false)
}

fn is_radio_input(dom: &Dom, node: NodeId) -> bool {
    dom.is_tag(node, "input")
        && dom
            .attr(node, "type")
            .map(|kind| kind.eq_ignore_ascii_case("radio"))
            .unwrap_or(false)
}

fn is_number_input(dom: &Dom, node: NodeId) -> bool {
    dom.is_tag(node, "input")
        && dom
            .attr(node, "type")
            .map(|kind| kind.eq_ignore_ascii_case("number"))
            .unwrap_or(false)
}

fn is_submit_control(dom: &Dom, node: NodeId) -> bool {
    if dom.is_tag(node, "button") {
        return dom
            .attr(node, "type")
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(true);
    }
    dom.is_tag(node, "input")
        && dom
            .attr(node, "type")
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(false)
}

fn format_number(value: f64) -> String {
    let mut out = format!("{value:.16}");
    while out.contains('.') && out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
    out
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
