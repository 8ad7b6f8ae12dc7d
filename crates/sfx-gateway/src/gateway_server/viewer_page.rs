//! Viewer page renderer.
use html_escape::encode_text;
use sfx_dispatch::CommandSpec;

fn render_command_rows(commands: &[CommandSpec]) -> String {
    if commands.is_empty() {
        return r#"      <tr><td colspan="3">No commands configured.</td></tr>"#.to_string();
    }
    commands
        .iter()
        .map(|command| {
            format!(
                "      <tr><td>{}</td><td><code>{}</code></td><td>{}s</td></tr>",
                encode_text(&command.name),
                encode_text(&command.trigger),
                command.cooldown_seconds
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn render_viewer_page(
    channel: &str,
    commands: &[CommandSpec],
    websocket_path: &str,
) -> String {
    let channel = encode_text(channel);
    let rows = render_command_rows(commands);
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>sfxbridge · {channel}</title>
  <style>
    body {{
      margin: 0;
      font-family: "IBM Plex Sans", "Segoe UI", sans-serif;
      background: #10161c;
      color: #e6edf3;
    }}
    .container {{
      max-width: 720px;
      margin: 0 auto;
      padding: 1.5rem;
    }}
    table {{
      width: 100%;
      border-collapse: collapse;
    }}
    td, th {{
      text-align: left;
      padding: 0.4rem 0.6rem;
      border-bottom: 1px solid #2b3a47;
    }}
    #status {{
      font-size: 0.85rem;
      color: #8aa4b8;
    }}
  </style>
</head>
<body>
  <div class="container">
    <h1>#{channel}</h1>
    <p id="status">connecting…</p>
    <table>
      <thead><tr><th>Name</th><th>Trigger</th><th>Cooldown</th></tr></thead>
      <tbody>
{rows}
      </tbody>
    </table>
  </div>
  <script>
    (function () {{
      const status = document.getElementById("status");
      const scheme = window.location.protocol === "https:" ? "wss" : "ws";
      const url = scheme + "://" + window.location.host + "{websocket_path}";
      let retryDelayMs = 1000;

      function connect() {{
        const socket = new WebSocket(url);
        socket.onopen = function () {{
          status.textContent = "listening";
          retryDelayMs = 1000;
        }};
        socket.onmessage = function (event) {{
          if (typeof event.data !== "string" || !event.data.startsWith("data:")) {{
            return;
          }}
          new Audio(event.data).play().catch(function (error) {{
            status.textContent = "playback blocked: " + error;
          }});
        }};
        socket.onclose = function () {{
          status.textContent = "disconnected, retrying";
          setTimeout(connect, retryDelayMs);
          retryDelayMs = Math.min(retryDelayMs * 2, 30000);
        }};
      }}

      connect();
    }})();
  </script>
</body>
</html>
"#
    )
}
