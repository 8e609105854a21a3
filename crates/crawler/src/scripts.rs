//! JavaScript injected into the portals. Each constant is a function
//! expression invoked through `PageHandle::run_in_page` with a JSON `args`.

/// Fills and submits the login form when its marker is on the page.
/// Returns whether credentials were submitted.
pub const LOGIN: &str = r#"(args) => {
    if (!document.querySelector(args.marker)) return false;
    const identity = document.querySelector(args.identity);
    const secret = document.querySelector(args.secret);
    const submit = document.querySelector(args.submit);
    if (!identity || !secret || !submit) throw new Error('login form is incomplete');
    identity.value = args.id;
    secret.value = args.password;
    identity.dispatchEvent(new Event('input', { bubbles: true }));
    secret.dispatchEvent(new Event('input', { bubbles: true }));
    submit.click();
    return true;
}"#;

/// True once the work-list iframe exposes both `UNIUX` and `grid`.
pub const TASK_READY: &str = r#"(args) => {
    const nav = document.querySelector(args.nav);
    if (!nav) return false;
    const frameId = nav.getAttribute('aria-controls');
    if (!frameId) return false;
    const frame = document.getElementById(frameId);
    const win = frame && frame.contentWindow;
    return !!(win && win.UNIUX && win.grid);
}"#;

/// Sets every `[key, value]` pair through `UNIUX.SVC` and clicks the search button.
pub const TASK_SEARCH: &str = r#"(args) => {
    const nav = document.querySelector(args.nav);
    const frame = nav && document.getElementById(nav.getAttribute('aria-controls'));
    const win = frame && frame.contentWindow;
    if (!win || !win.UNIUX) throw new Error('work-list frame is gone');
    for (const [key, value] of args.params) win.UNIUX.SVC(key, value);
    const button = win.document.querySelector(args.button);
    if (!button) throw new Error('search button ' + args.button + ' not found');
    button.click();
    return true;
}"#;

/// All grid rows, or `null` when the grid has nothing to give.
pub const TASK_ROWS: &str = r#"(args) => {
    const nav = document.querySelector(args.nav);
    const frame = nav && document.getElementById(nav.getAttribute('aria-controls'));
    const win = frame && frame.contentWindow;
    if (!win || !win.grid) throw new Error('grid is gone');
    const rows = win.grid.getAllRowValue();
    return rows ? JSON.parse(JSON.stringify(rows)) : null;
}"#;

/// Clicks the element matching `args.selector`.
pub const CLICK: &str = r#"(args) => {
    const el = document.querySelector(args.selector);
    if (!el) throw new Error('element ' + args.selector + ' not found');
    el.click();
    return true;
}"#;

/// POSTs `args.body` as JSON with the page's session cookies and returns the parsed reply.
pub const POST_JSON: &str = r#"async (args) => {
    const res = await fetch(args.endpoint, {
        method: 'POST',
        credentials: 'include',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(args.body),
    });
    if (!res.ok) throw new Error('POST ' + args.endpoint + ' returned ' + res.status);
    return await res.json();
}"#;
