use axum::response::Html;

/// A feature card on the landing page.
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
    pub stat: &'static str,
}

pub const FEATURES: [Feature; 4] = [
    Feature {
        title: "AI-Assisted Order Generation",
        description: "Transform natural language requests into perfect purchase orders with intelligent automation.",
        stat: "75% faster processing",
    },
    Feature {
        title: "Predictive Analytics",
        description: "Smart insights predict ordering patterns and optimize your procurement strategy.",
        stat: "$2M+ annual savings",
    },
    Feature {
        title: "Vendor Management",
        description: "Centralized vendor relationships with automated performance tracking and scoring.",
        stat: "40% better performance",
    },
    Feature {
        title: "Enterprise Security",
        description: "Bank-grade security with seamless ERP integration and compliance automation.",
        stat: "100% compliance rate",
    },
];

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ProcureAI - AI-Powered Procurement</title>
</head>
<body>
    <header>
        <h1>ProcureAI</h1>
        <p>Revolutionize procurement with AI-assisted ordering, predictive analytics and vendor management.</p>
    </header>
    <section id="features">
"#;

const PAGE_FORM: &str = r#"    </section>
    <section id="get-started">
        <h2>Get Started Today</h2>
        <div id="banner" role="status" hidden></div>
        <form id="lead-form">
            <input name="name" placeholder="Full Name" required>
            <input name="email" type="email" placeholder="Work Email" required>
            <input name="company" placeholder="Company" required>
            <button type="submit">Request Demo</button>
        </form>
    </section>
    <script>
        const instance = crypto.randomUUID();
        const form = document.getElementById("lead-form");
        const banner = document.getElementById("banner");

        async function refreshBanner() {
            const res = await fetch("/api/v1/leads/status", { headers: { "X-Form-Instance": instance } });
            const state = await res.json();
            banner.hidden = state.status === "idle";
            banner.textContent = state.status === "success"
                ? "Thanks! We'll be in touch soon."
                : (state.message || "");
        }

        form.addEventListener("submit", async (event) => {
            event.preventDefault();
            const button = form.querySelector("button");
            button.disabled = true;
            try {
                const res = await fetch("/api/v1/leads", {
                    method: "POST",
                    headers: { "Content-Type": "application/json", "X-Form-Instance": instance },
                    body: JSON.stringify(Object.fromEntries(new FormData(form))),
                });
                const body = await res.json();
                if (body.clear_form) form.reset();
            } finally {
                button.disabled = false;
                await refreshBanner();
            }
        });

        setInterval(refreshBanner, 1000);
    </script>
</body>
</html>
"#;

/// Renders the landing page with its lead capture form.
pub fn render_landing_page() -> String {
    let mut page = String::from(PAGE_HEAD);
    for feature in &FEATURES {
        page.push_str(&format!(
            "        <article><h3>{}</h3><p>{}</p><strong>{}</strong></article>\n",
            feature.title, feature.description, feature.stat
        ));
    }
    page.push_str(PAGE_FORM);
    page
}

/// GET /
pub async fn serve_landing_page() -> Html<String> {
    Html(render_landing_page())
}
