pub const TASKS_INDEX: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>To-Do List</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 640px; margin: 24px auto; padding: 0 12px; color: #1f2937; }
    form { display: flex; gap: 8px; margin-bottom: 16px; }
    input[type=text] { flex: 1; }
    li { display: flex; align-items: center; gap: 8px; padding: 6px 0; border-bottom: 1px solid #e5e7eb; }
    li.done span.desc { text-decoration: line-through; color: #9ca3af; }
    .high { color: #b91c1c; } .medium { color: #b45309; } .low { color: #047857; }
    .due { font-size: 0.85em; color: #6b7280; }
    .error { color: #b91c1c; min-height: 1.2em; }
  </style>
</head>
<body>
  <h1>To-Do List</h1>
  <form id="add">
    <input type="text" id="description" placeholder="What needs doing?" />
    <select id="priority">
      <option value="high">high</option>
      <option value="medium" selected>medium</option>
      <option value="low">low</option>
    </select>
    <input type="date" id="due_date" />
    <button type="submit">Add</button>
  </form>
  <div class="error" id="error"></div>
  <ul id="tasks"></ul>
  <script>
    const errorEl = document.getElementById('error');

    async function call(method, url, body) {
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body),
      });
      const data = await res.json();
      if (!res.ok) { throw new Error(data.error || res.statusText); }
      return data;
    }

    function render(tasks) {
      const list = document.getElementById('tasks');
      list.innerHTML = '';
      for (const t of tasks) {
        const li = document.createElement('li');
        if (t.completed) li.classList.add('done');
        li.innerHTML = `
          <input type="checkbox" ${t.completed ? 'checked' : ''} />
          <span class="${t.priority}">[${t.priority}]</span>
          <span class="desc"></span>
          <span class="due"></span>
          <button data-act="edit">Edit</button>
          <button data-act="delete">Delete</button>`;
        li.querySelector('.desc').textContent = t.description;
        li.querySelector('.due').textContent = t.due_date ? 'due ' + t.due_date : '';
        li.querySelector('input').onchange = () => run(() => call('PUT', `/api/tasks/${t.id}/complete`));
        li.querySelector('[data-act=edit]').onclick = () => {
          const description = prompt('Description', t.description);
          if (description === null) return;
          const priority = prompt('Priority (high/medium/low)', t.priority) || t.priority;
          const due_date = prompt('Due date (YYYY-MM-DD, blank for none)', t.due_date || '') || null;
          run(() => call('PUT', `/api/tasks/${t.id}`, { description, priority, due_date }));
        };
        li.querySelector('[data-act=delete]').onclick = () => run(() => call('DELETE', `/api/tasks/${t.id}`));
        list.appendChild(li);
      }
    }

    async function run(action) {
      errorEl.textContent = '';
      try { await action(); } catch (err) { errorEl.textContent = err.message; }
      render(await call('GET', '/api/tasks'));
    }

    document.getElementById('add').onsubmit = (e) => {
      e.preventDefault();
      const description = document.getElementById('description').value;
      const priority = document.getElementById('priority').value;
      const due_date = document.getElementById('due_date').value || null;
      run(async () => {
        await call('POST', '/api/tasks', { description, priority, due_date });
        document.getElementById('description').value = '';
      });
    };

    run(async () => {});
  </script>
</body>
</html>"#;

pub const VALENTINE_INDEX: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>For You</title>
  <style>
    body { font-family: Georgia, serif; margin: 24px auto; max-width: 900px; padding: 0 12px; background: #fff5f7; color: #4a1d2b; }
    h1 { text-align: center; }
    .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(260px, 1fr)); gap: 16px; }
    .card { background: white; border: 1px solid #f4c2cf; border-radius: 12px; padding: 12px; }
    form { display: flex; gap: 6px; margin-bottom: 8px; }
    form input { flex: 1; }
    li { padding: 4px 0; }
    li.watched .label { text-decoration: line-through; opacity: 0.6; }
    .error { color: #b91c1c; min-height: 1.2em; }
  </style>
</head>
<body>
  <h1>Our little lists</h1>
  <div class="error" id="error"></div>
  <div class="grid">
    <div class="card"><h3>Wishlist</h3>
      <form data-collection="wishlist" data-key="name"><input placeholder="Something nice" /><button>Add</button></form>
      <ul id="wishlist"></ul>
    </div>
    <div class="card"><h3>Watchlist</h3>
      <form data-collection="watchlist" data-key="title"><input placeholder="A movie to watch" /><button>Add</button></form>
      <ul id="watchlist"></ul>
    </div>
    <div class="card"><h3>Halloween</h3>
      <form data-collection="halloween" data-key="title"><input placeholder="Spooky plans" /><button>Add</button></form>
      <ul id="halloween"></ul>
    </div>
  </div>
  <audio controls loop src="/static/music/song.mp3" style="margin-top:16px;width:100%"></audio>
  <script>
    const errorEl = document.getElementById('error');
    const keys = { wishlist: 'name', watchlist: 'title', halloween: 'title' };

    async function call(method, url, body) {
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body),
      });
      const data = await res.json();
      if (!res.ok) { throw new Error(data.error || res.statusText); }
      return data;
    }

    async function load(collection) {
      const items = await call('GET', `/api/${collection}`);
      const list = document.getElementById(collection);
      list.innerHTML = '';
      for (const item of items) {
        const li = document.createElement('li');
        if (item.watched) li.classList.add('watched');
        li.innerHTML = `<label><input type="checkbox" ${item.watched ? 'checked' : ''} /> <span class="label"></span></label> <button>x</button>`;
        li.querySelector('.label').textContent = item[keys[collection]];
        li.querySelector('input').onchange = (e) =>
          run(collection, () => call('PUT', `/api/${collection}/${item.id}`, { watched: e.target.checked }));
        li.querySelector('button').onclick = () =>
          run(collection, () => call('DELETE', `/api/${collection}/${item.id}`));
        list.appendChild(li);
      }
    }

    async function run(collection, action) {
      errorEl.textContent = '';
      try { await action(); } catch (err) { errorEl.textContent = err.message; }
      await load(collection);
    }

    for (const form of document.querySelectorAll('form')) {
      form.onsubmit = (e) => {
        e.preventDefault();
        const input = form.querySelector('input');
        const collection = form.dataset.collection;
        run(collection, async () => {
          await call('POST', `/api/${collection}`, { [form.dataset.key]: input.value });
          input.value = '';
        });
      };
    }

    Object.keys(keys).forEach((c) => run(c, async () => {}));
  </script>
</body>
</html>"#;
