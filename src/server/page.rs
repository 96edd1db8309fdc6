//! Static chat page served at `/`.

/// Single-page chat client. Session id comes from `?sessionId=` (default `demo`).
pub const INDEX_HTML: &str = r#"<!doctype html>
<meta charset="utf-8"/>
<title>Session Chat</title>
<style>
  body { max-width: 760px; margin: 40px auto; font-family: ui-sans-serif, system-ui; }
  #log { white-space: pre-wrap; border: 1px solid #ddd; padding: 12px; border-radius: 10px; min-height: 240px; }
  form { margin-top: 12px; display: flex; gap: 10px; }
  input, button { padding: 10px 12px; font-size: 16px; }
  .typing { display: inline-flex; align-items: center; gap: 6px; }
  .dot { width: 6px; height: 6px; border-radius: 50%; background: #888; opacity: .3; animation: blink 1.2s infinite; }
  .dot:nth-child(2) { animation-delay: .2s }
  .dot:nth-child(3) { animation-delay: .4s }
  @keyframes blink { 0%, 100% { opacity: .2 } 50% { opacity: 1 } }
  .muted { color: #666 }
</style>
<h1>Session Chat</h1>
<div><small>Session: <code id="sid">demo</code></small></div>
<div id="log">Loading history…</div>
<form id="f">
  <input id="t" placeholder="Say something…" style="flex:1"/>
  <button id="send">Send</button>
</form>
<script>
const sid = new URL(location.href).searchParams.get('sessionId') || 'demo';
document.getElementById('sid').textContent = sid;
const log = document.getElementById('log');
const form = document.getElementById('f');
const input = document.getElementById('t');
const send = document.getElementById('send');

const label = role => role === 'user' ? '🧑' : role === 'assistant' ? '🤖' : '⚙️';

function appendLine(role, text) {
  log.textContent += (log.textContent ? '\n\n' : '') + label(role) + ' ' + text;
}

function appendTyping() {
  const wrapper = document.createElement('div');
  wrapper.style.marginTop = log.textContent ? '12px' : '0';
  const who = document.createElement('span');
  who.textContent = label('assistant') + ' ';
  const dots = document.createElement('span');
  dots.className = 'typing';
  dots.innerHTML = '<span class="dot"></span><span class="dot"></span><span class="dot"></span>';
  wrapper.appendChild(who);
  wrapper.appendChild(dots);
  log.appendChild(wrapper);
  return wrapper;
}

async function loadHistory() {
  const r = await fetch('/history?sessionId=' + encodeURIComponent(sid));
  const messages = await r.json();
  log.textContent = (messages || [])
    .map(m => label(m.role) + ' ' + m.content)
    .join('\n\n') || '(no history yet)';
}
loadHistory();

form.addEventListener('submit', async (e) => {
  e.preventDefault();
  const text = input.value.trim();
  if (!text) return;

  input.disabled = true; send.disabled = true; send.textContent = 'Thinking…';
  if (log.textContent === '(no history yet)') log.textContent = '';
  appendLine('user', text);
  input.value = '';
  const typing = appendTyping();

  try {
    const r = await fetch('/chat', {
      method: 'POST',
      headers: { 'content-type': 'application/json' },
      body: JSON.stringify({ sessionId: sid, text })
    });
    if (!r.ok) throw new Error(r.status + ' ' + await r.text());
    const { text: out } = await r.json();
    typing.replaceWith(document.createTextNode('\n\n' + label('assistant') + ' ' + out));
  } catch (err) {
    typing.replaceWith(document.createTextNode('\n\n' + label('assistant') + ' (error)'));
    const line = document.createElement('div');
    line.className = 'muted';
    line.textContent = String(err);
    log.appendChild(line);
  } finally {
    input.disabled = false; send.disabled = false; send.textContent = 'Send';
    input.focus();
  }
});
</script>
"#;
