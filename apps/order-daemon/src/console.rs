//! Browser console served at `/` for sending frames by hand.

use axum::response::Html;

const WS_PATH_MARKER: &str = "__WS_PATH__";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>order-daemon console</title>
<script>
window.addEventListener("load", function () {
    var output = document.getElementById("output");
    var input = document.getElementById("input");
    var ws = null;

    var print = function (message) {
        var line = document.createElement("div");
        line.textContent = message;
        output.appendChild(line);
    };

    document.getElementById("open").onclick = function () {
        if (ws) {
            return false;
        }
        var scheme = location.protocol === "https:" ? "wss://" : "ws://";
        ws = new WebSocket(scheme + location.host + "__WS_PATH__");
        ws.onopen = function () { print("OPEN"); };
        ws.onclose = function () { print("CLOSE"); ws = null; };
        ws.onmessage = function (evt) { print("RESPONSE: " + evt.data); };
        ws.onerror = function () { print("ERROR"); };
        return false;
    };

    document.getElementById("send").onclick = function () {
        if (!ws) {
            return false;
        }
        print("SEND: " + input.value);
        ws.send(input.value);
        return false;
    };

    document.getElementById("close").onclick = function () {
        if (ws) {
            ws.close();
        }
        return false;
    };
});
</script>
</head>
<body>
<p>Open a connection, edit the frame and press Send. Responses appear below.</p>
<form>
<button id="open">Open</button>
<button id="close">Close</button>
<p><textarea id="input" rows="4" cols="80">{"header": [1, 1, 100, 0, 0, 0], "data": {"query": "menu", "result": ""}}</textarea></p>
<button id="send">Send</button>
</form>
<div id="output"></div>
</body>
</html>
"#;

/// Render the console page for a daemon serving frames on `ws_path`
pub fn render(ws_path: &str) -> Html<String> {
    Html(TEMPLATE.replace(WS_PATH_MARKER, ws_path))
}
