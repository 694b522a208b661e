use axum::{extract::State, response::Html};
use tracing::info;

use crate::state::AppState;
use crate::upload::{describe_limit, IMAGE_FIELD};

const INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Alt Text Generator</title>
    <script src="https://unpkg.com/htmx.org@1.9.12"></script>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 20px;
        }

        .container {
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
            max-width: 640px;
            width: 100%;
            padding: 40px;
        }

        h1 {
            color: #333;
            margin-bottom: 10px;
        }

        .subtitle {
            color: #666;
            margin-bottom: 30px;
            font-size: 0.9em;
        }

        .upload-area {
            border: 3px dashed #667eea;
            border-radius: 15px;
            padding: 40px 20px;
            text-align: center;
            background: #f8f9ff;
        }

        .upload-hint {
            color: #999;
            font-size: 0.9em;
            margin-top: 10px;
        }

        button {
            margin-top: 20px;
            background: #667eea;
            color: white;
            border: none;
            border-radius: 20px;
            padding: 10px 24px;
            font-weight: 600;
            cursor: pointer;
        }

        #alt-text {
            background: #f8f9ff;
            border-radius: 10px;
            padding: 20px;
            margin-top: 20px;
            color: #333;
            line-height: 1.6;
        }

        .htmx-indicator {
            display: none;
            color: #667eea;
            margin-top: 15px;
        }

        .htmx-request .htmx-indicator {
            display: block;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>Alt Text Generator</h1>
        <p class="subtitle">Upload an image and get a description you can paste into an alt attribute.</p>

        <div id="result">
            <form hx-post="/upload" hx-encoding="multipart/form-data" hx-target="#result">
                <div class="upload-area">
                    <input type="file" name="{{field}}" accept="image/png,image/jpeg,image/gif,image/webp" required>
                    <div class="upload-hint">PNG, JPEG, GIF or WebP, up to {{max_upload}}</div>
                </div>
                <button type="submit">Generate Alt Text</button>
                <div class="htmx-indicator">Generating alt text...</div>
            </form>
        </div>
    </div>
</body>
</html>
"##;

pub fn render_index(max_upload_bytes: usize) -> String {
    INDEX_TEMPLATE
        .replace("{{field}}", IMAGE_FIELD)
        .replace("{{max_upload}}", &describe_limit(max_upload_bytes))
}

/// `GET /`: the upload form.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    info!("Serving home page");
    Html(render_index(state.config.upload.max_bytes))
}
