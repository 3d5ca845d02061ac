/*!
# Getting Started with U8g2 Preview

Point the executable at a sketch. The first line of output describes the
frame; below it the display is drawn with half-block characters, two pixel
rows per line of text.

<pre><code>&nbsp;$ u8g2-preview hello.ino
&nbsp;[compile] ops=4 lines=31 defines=2 consts=1
&nbsp;128x64 @x2 ops:4 font:u8g2_font_6x10_tf(10px) crc:0F3A9C51
</code></pre>

Progress lines in brackets go to stderr and can be silenced with `--quiet`.
Warnings such as an argument that could not be evaluated are printed in
yellow with the source line they came from. Nothing stops the preview; a
call that cannot be understood is simply left out.

The size in the summary comes from `--width` and `--height`, or from a
JSON file given with `--config`. A comment in the sketch itself takes
precedence over both:

```text
// size: 128x32
```

`size=128x32` and `size 128x32` work as well, in line or block comments.

Save the frame with `--out frame.pgm`, enlarged with `--zoom 4` if you like.
While editing, `--watch` keeps the preview current and re-renders each time
the file is saved. Stop it with CTRL-C.

`--repl` opens a line editor instead. Each line you type is added to a
buffer and the whole buffer is previewed again. `:list` shows the buffer,
`:clear` empties it and `:quit` leaves.

<pre><code>&nbsp;> #define W 20
&nbsp;> u8g2.drawFrame(0, 0, W, 10);
&nbsp;  128x64 @x2 ops:1 crc:6B0E2C47
</code></pre>

To check what the scanner found without drawing anything, use
`--emit-ops`. It prints the operations, counts and warnings as JSON.
*/
