//! Landing Page
//!
//! Marketing page for visitors: hero, features, testimonials and pricing.

use leptos::prelude::*;
use tasker_core::Route;

use crate::components::Link;

struct Feature {
    title: &'static str,
    text: &'static str,
}

struct Testimonial {
    name: &'static str,
    role: &'static str,
    quote: &'static str,
    avatar: &'static str,
}

struct PricingTier {
    title: &'static str,
    price: &'static str,
    features: &'static [&'static str],
    cta: &'static str,
    highlight: bool,
}

const FEATURES: &[Feature] = &[
    Feature {
        title: "Smart Task Management",
        text: "Create, organize, and prioritize tasks with ease. Stay on top of your to-dos effortlessly.",
    },
    Feature {
        title: "Reminders & Deadlines",
        text: "Never miss a deadline with customizable reminders and recurring tasks.",
    },
    Feature {
        title: "Collaboration",
        text: "Work with your team, assign tasks, and track progress together in real time.",
    },
];

const TESTIMONIALS: &[Testimonial] = &[
    Testimonial {
        name: "Jane Doe",
        role: "Product Manager",
        quote: "Tasker has completely transformed the way I organize my work. It's intuitive and powerful!",
        avatar: "https://randomuser.me/api/portraits/women/44.jpg",
    },
    Testimonial {
        name: "John Smith",
        role: "Freelancer",
        quote: "I love how easy it is to keep track of my projects. The reminders are a lifesaver!",
        avatar: "https://randomuser.me/api/portraits/men/32.jpg",
    },
    Testimonial {
        name: "Emily Chen",
        role: "Developer",
        quote: "The best productivity app I've used. The UI is beautiful and everything just works.",
        avatar: "https://randomuser.me/api/portraits/women/68.jpg",
    },
];

const PRICING: &[PricingTier] = &[
    PricingTier {
        title: "Free",
        price: "$0",
        features: &["Unlimited tasks", "Basic reminders", "1 project", "Community support"],
        cta: "Get Started",
        highlight: false,
    },
    PricingTier {
        title: "Pro",
        price: "$20/mo",
        features: &["Unlimited projects", "Advanced reminders", "Collaboration tools", "Priority support"],
        cta: "Upgrade Now",
        highlight: true,
    },
    PricingTier {
        title: "Team",
        price: "$50/mo",
        features: &["Team workspaces", "Admin controls", "Integrations", "Dedicated support"],
        cta: "Start Team Trial",
        highlight: false,
    },
];

#[component]
pub fn Landing() -> impl IntoView {
    view! {
        <div class="landing">
            <section id="hero" class="hero">
                <h1>"Organize your life with " <span class="accent">"Tasker"</span></h1>
                <p>"The ultimate productivity app to manage your tasks, projects, and goals, all in one place."</p>
                <Link to=Route::SignUp class="btn btn-primary">"Try Tasker Free"</Link>
            </section>

            <section id="features" class="features">
                <h2>"Features"</h2>
                <div class="feature-grid">
                    {FEATURES
                        .iter()
                        .map(|f| view! {
                            <div class="feature-card">
                                <h3>{f.title}</h3>
                                <p>{f.text}</p>
                            </div>
                        })
                        .collect_view()}
                </div>
            </section>

            <section id="testimonials" class="testimonials">
                <h2>"What our users say"</h2>
                <div class="testimonial-grid">
                    {TESTIMONIALS
                        .iter()
                        .map(|t| view! {
                            <figure class="testimonial-card">
                                <img src=t.avatar alt=t.name width="64" height="64" />
                                <blockquote>{t.quote}</blockquote>
                                <figcaption>
                                    <strong>{t.name}</strong>
                                    <span>{t.role}</span>
                                </figcaption>
                            </figure>
                        })
                        .collect_view()}
                </div>
            </section>

            <section id="pricing" class="pricing">
                <h2>"Pricing"</h2>
                <div class="pricing-grid">
                    {PRICING
                        .iter()
                        .map(|tier| view! {
                            <div class="pricing-card" class:highlight=tier.highlight>
                                <h3>{tier.title}</h3>
                                <p class="price">{tier.price}</p>
                                <ul>
                                    {tier.features.iter().map(|f| view! { <li>{*f}</li> }).collect_view()}
                                </ul>
                                <Link to=Route::SignUp class="btn">{tier.cta}</Link>
                            </div>
                        })
                        .collect_view()}
                </div>
            </section>

            <footer id="contact" class="footer">
                <p>"Questions? Reach us at support@tasker.app"</p>
            </footer>
        </div>
    }
}
